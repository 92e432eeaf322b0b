//! Page templates.

use axum::response::Html;
use entities::User;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ServerResult;
use crate::middleware::CurrentSession;
use crate::web::flash::FlashMessage;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("register.html", include_str!("../../templates/register.html")),
    ("profile.html", include_str!("../../templates/profile.html")),
];

/// Loads the templates compiled into the binary.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}

/// User fields shown on pages.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub email: String,
    pub display_name: String,
    pub member_since: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            display_name: user.display_name(),
            member_since: user.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Builds the context every page shares.
pub fn page_context(
    title: &str,
    current: Option<&CurrentSession>,
    flash: Option<&FlashMessage>,
) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    if let Some(current) = current {
        context.insert("current_user", &UserView::from(&current.user));
        context.insert("csrf_token", &current.session.csrf_token);
    }
    if let Some(flash) = flash {
        context.insert("flash", flash);
    }
    context
}

/// Renders a template.
pub fn render(templates: &Tera, name: &str, context: &Context) -> ServerResult<Html<String>> {
    Ok(Html(templates.render(name, context)?))
}

#[cfg(test)]
mod tests {
    use auth::Session;
    use chrono::Duration;
    use entities::TodoStats;

    use super::*;

    fn current() -> CurrentSession {
        let user = User::new("jane@example.com", "hash");
        let session = Session::new(user.id, Duration::hours(1)).unwrap();
        CurrentSession { user, session }
    }

    #[test]
    fn test_all_templates_load() {
        let tera = load_templates().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        for (name, _) in TEMPLATES {
            assert!(names.contains(name), "missing template {name}");
        }
    }

    #[test]
    fn test_index_embeds_csrf_token() {
        let tera = load_templates().unwrap();
        let current = current();
        let context = page_context("My Todos", Some(&current), None);

        let Html(html) = render(&tera, "index.html", &context).unwrap();
        assert!(html.contains(&format!(
            r#"<meta name="csrf-token" content="{}">"#,
            current.session.csrf_token
        )));
        assert!(html.contains(r#"data-widget="stats""#));
        assert!(html.contains("/assets/todos.js"));
        assert!(html.contains("Jane"));
    }

    #[test]
    fn test_flash_is_escaped() {
        let tera = load_templates().unwrap();
        let flash = FlashMessage::alert("<b>bold</b>");
        let mut context = page_context("Log in", None, Some(&flash));
        context.insert("email", "");

        let Html(html) = render(&tera, "login.html", &context).unwrap();
        assert!(html.contains("&lt;b&gt;bold&lt;&#x2F;b&gt;"));
        assert!(!html.contains("csrf-token"));
    }

    #[test]
    fn test_register_lists_errors() {
        let tera = load_templates().unwrap();
        let mut context = page_context("Sign up", None, None);
        context.insert("email", "bad");
        context.insert("errors", &vec!["Email is invalid".to_string()]);

        let Html(html) = render(&tera, "register.html", &context).unwrap();
        assert!(html.contains("Email is invalid"));
        assert!(html.contains(r#"value="bad""#));
    }

    #[test]
    fn test_profile_shows_stats() {
        let tera = load_templates().unwrap();
        let current = current();
        let mut context = page_context("Profile", Some(&current), None);
        context.insert("stats", &TodoStats::from_counts(3, 1));

        let Html(html) = render(&tera, "profile.html", &context).unwrap();
        assert!(html.contains("jane@example.com"));
        assert!(html.contains("33.3%"));
    }
}
