//! Current user endpoint.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::MaybeUser;

/// Public view of the logged-in user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Returns the logged-in user.
pub async fn current_user(current: MaybeUser) -> ServerResult<Json<MeResponse>> {
    let user = current.user().ok_or(ServerError::AuthenticationRequired)?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email.clone(),
        display_name: user.display_name(),
        created_at: user.created_at,
    }))
}
