//! Page handlers.

use std::sync::Arc;

use auth::AuthError;
use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use entities::Registration;
use serde::Deserialize;
use todo_store::TodoStore;

use crate::error::{ServerError, ServerResult};
use crate::middleware::{
    CurrentSession, MaybeUser,
    session::{SESSION_COOKIE, clear_session_cookie, session_cookie},
};
use crate::services::{AccountService, TodoService};
use crate::state::AppState;
use crate::web::flash::{self, Flash, FlashMessage};
use crate::web::templates::{page_context, render};

/// Login form fields.
#[derive(Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Logout form fields.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutForm {
    #[serde(default)]
    pub authenticity_token: String,
}

/// The todo page.
pub async fn index<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentSession>,
    jar: CookieJar,
) -> ServerResult<(CookieJar, Html<String>)> {
    let (jar, flash) = flash::take(jar);
    let context = page_context("My Todos", Some(&current), flash.as_ref());
    Ok((jar, render(&state.templates, "index.html", &context)?))
}

/// The profile page.
pub async fn profile<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentSession>,
    jar: CookieJar,
) -> ServerResult<(CookieJar, Html<String>)> {
    let stats = TodoService::new(&state.store)
        .stats(Some(&current.user))
        .await?;

    let (jar, flash) = flash::take(jar);
    let mut context = page_context("Profile", Some(&current), flash.as_ref());
    context.insert("stats", &stats);
    Ok((jar, render(&state.templates, "profile.html", &context)?))
}

/// The login page.
pub async fn login_form<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
    jar: CookieJar,
) -> ServerResult<(CookieJar, Html<String>)> {
    let (jar, flash) = flash::take(jar);
    let mut context = page_context("Log in", current.0.as_ref(), flash.as_ref());
    context.insert("email", "");
    Ok((jar, render(&state.templates, "login.html", &context)?))
}

/// Handles the login form.
pub async fn login<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ServerResult<Response> {
    let accounts = AccountService::new(&state);

    match accounts.login(&form.email, &form.password).await {
        Ok((_, session)) => {
            let previous = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());
            accounts.logout(previous.as_deref()).await?;

            let jar = jar.add(session_cookie(&session, state.config.secure_cookies));
            let jar = flash::set(jar, Flash::LoggedIn);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(ServerError::Auth(AuthError::InvalidCredentials)) => {
            let alert = FlashMessage::alert("Invalid email or password");
            let mut context = page_context("Log in", None, Some(&alert));
            context.insert("email", &form.email);
            let page = render(&state.templates, "login.html", &context)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// The registration page.
pub async fn register_form<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
    jar: CookieJar,
) -> ServerResult<(CookieJar, Html<String>)> {
    let (jar, flash) = flash::take(jar);
    let mut context = page_context("Sign up", current.0.as_ref(), flash.as_ref());
    context.insert("email", "");
    Ok((jar, render(&state.templates, "register.html", &context)?))
}

/// Handles the registration form.
pub async fn register<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    Form(registration): Form<Registration>,
) -> ServerResult<Response> {
    let email = registration.email.clone();

    match AccountService::new(&state).register(registration).await {
        Ok((_, session)) => {
            let jar = jar.add(session_cookie(&session, state.config.secure_cookies));
            let jar = flash::set(jar, Flash::Registered);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(ServerError::Validation(errors)) => {
            let mut context = page_context("Sign up", None, None);
            context.insert("email", &email);
            context.insert("errors", &errors);
            let page = render(&state.templates, "register.html", &context)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Handles the logout form.
pub async fn logout<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentSession>,
    jar: CookieJar,
    Form(form): Form<LogoutForm>,
) -> ServerResult<(CookieJar, Redirect)> {
    if !current.session.verify_csrf(&form.authenticity_token) {
        tracing::warn!(user_id = %current.user.id, "Rejected logout with invalid CSRF token");
        return Err(ServerError::InvalidCsrfToken);
    }

    AccountService::new(&state)
        .logout(Some(&current.session.token))
        .await?;
    tracing::info!(user_id = %current.user.id, "User logged out");

    let jar = flash::set(clear_session_cookie(jar), Flash::LoggedOut);
    Ok((jar, Redirect::to("/login")))
}
