//! Session middleware.

use std::{convert::Infallible, sync::Arc};

use auth::Session;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderName, Method, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use entities::User;
use todo_store::TodoStore;

use crate::error::ServerError;
use crate::services::AccountService;
use crate::state::AppState;
use crate::web::flash::{self, Flash};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "todo_session";

/// Header carrying the CSRF token on API requests.
pub static CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

/// The logged-in user and their session.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    /// Logged-in user.
    pub user: User,
    /// Active session.
    pub session: Session,
}

/// Extractor for the optional current session.
///
/// Never rejects; handlers that need a user decide how to respond.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentSession>);

impl MaybeUser {
    /// Returns the logged-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref().map(|current| &current.user)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentSession>().cloned()))
    }
}

/// Builds the session cookie for a freshly started session.
pub fn session_cookie(session: &Session, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Removes the session cookie from the jar.
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Session loading middleware.
///
/// Resolves the session cookie and stores the [`CurrentSession`] in the
/// request extensions. Stale cookies are cleared on the way out.
pub async fn load_session<S: TodoStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) else {
        return next.run(request).await;
    };

    let resolved = match AccountService::new(&state).current_session(&token).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to resolve session");
            None
        }
    };

    match resolved {
        Some(current) => {
            request.extensions_mut().insert(current);
            next.run(request).await
        }
        None => {
            let response = next.run(request).await;
            if sets_session_cookie(&response) {
                response
            } else {
                (clear_session_cookie(jar), response).into_response()
            }
        }
    }
}

/// Login guard for pages.
///
/// Redirects to `/login` with an alert when no session resolved.
pub async fn require_login(jar: CookieJar, request: Request, next: Next) -> Response {
    if request.extensions().get::<CurrentSession>().is_some() {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "Redirecting anonymous request to login");
    (flash::set(jar, Flash::LoginRequired), Redirect::to("/login")).into_response()
}

/// CSRF guard for the JSON API.
///
/// Mutating requests made with a session must echo the session's CSRF token
/// in the `X-CSRF-Token` header.
pub async fn verify_csrf(request: Request, next: Next) -> Response {
    if is_mutating(request.method()) {
        if let Some(current) = request.extensions().get::<CurrentSession>() {
            let provided = request
                .headers()
                .get(&CSRF_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();

            if !current.session.verify_csrf(provided) {
                tracing::warn!(user_id = %current.user.id, "Rejected request with invalid CSRF token");
                return ServerError::InvalidCsrfToken.into_response();
            }
        }
    }

    next.run(request).await
}

fn is_mutating(method: &Method) -> bool {
    ![Method::GET, Method::HEAD, Method::OPTIONS].contains(method)
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
