//! Aggregate todo statistics.

use serde::{Deserialize, Serialize};

use crate::Todo;

/// Counts and completion rate over one user's todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoStats {
    /// Number of todos.
    pub total: u64,
    /// Number of completed todos.
    pub completed: u64,
    /// Number of todos not yet completed.
    pub pending: u64,
    /// Percentage of completed todos, rounded to one decimal place.
    pub completion_rate: f64,
}

impl TodoStats {
    /// Builds statistics from raw counts.
    ///
    /// `completed` is clamped to `total`, so `completed + pending == total`
    /// always holds.
    pub fn from_counts(total: u64, completed: u64) -> Self {
        let completed = completed.min(total);
        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate: completion_rate(completed, total),
        }
    }

    /// Builds statistics by counting a set of todos.
    pub fn from_todos<'a>(todos: impl IntoIterator<Item = &'a Todo>) -> Self {
        let (total, completed) = todos.into_iter().fold((0, 0), |(total, completed), todo| {
            (total + 1, completed + u64::from(todo.completed))
        });
        Self::from_counts(total, completed)
    }
}

/// `completed / total * 100`, rounded to one decimal place; `0` when empty.
pub fn completion_rate(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = completed as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = TodoStats::from_counts(0, 0);
        assert_eq!(stats, TodoStats::default());
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn test_completion_rate_rounding() {
        assert_eq!(completion_rate(1, 3), 33.3);
        assert_eq!(completion_rate(2, 3), 66.7);
        assert_eq!(completion_rate(1, 8), 12.5);
        assert_eq!(completion_rate(3, 3), 100.0);
        assert_eq!(completion_rate(0, 5), 0.0);
    }

    #[test]
    fn test_counts_add_up() {
        for total in 0..20 {
            for completed in 0..=total {
                let stats = TodoStats::from_counts(total, completed);
                assert_eq!(stats.completed + stats.pending, stats.total);
            }
        }
    }

    #[test]
    fn test_from_todos() {
        let owner_id = Uuid::new_v4();
        let todos = vec![
            Todo::new(owner_id, "a").with_completed(true),
            Todo::new(owner_id, "b"),
            Todo::new(owner_id, "c"),
        ];

        let stats = TodoStats::from_todos(&todos);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.completion_rate, 33.3);
    }
}
