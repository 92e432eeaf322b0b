//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use auth::{MIN_BCRYPT_COST, MemorySessionStore, SessionStore};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Method, Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use axum_extra::extract::cookie::Cookie;
use serde_json::Value;
use todo_server::{
    config::Config, create_app, create_state, middleware::session::SESSION_COOKIE,
    state::AppState,
};
use todo_store::MemoryTodoStore;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

/// A router over fresh in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState<MemoryTodoStore>>,
}

/// A registered, logged-in user.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub email: String,
    pub session_token: String,
    pub csrf_token: String,
}

impl TestUser {
    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.session_token)
    }
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config {
            database_url: "memory".to_string(),
            bcrypt_cost: MIN_BCRYPT_COST,
            ..Config::default()
        };
        let state = create_state(config, MemoryTodoStore::new(), MemorySessionStore::new())
            .expect("state builds");
        let router = create_app(state.clone());
        Self { router, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Registers through the form and returns the logged-in user.
    pub async fn register(&self, email: &str) -> TestUser {
        let response = self
            .send(form_request(
                "/register",
                &[
                    ("email", email),
                    ("password", PASSWORD),
                    ("password_confirmation", PASSWORD),
                ],
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let session_token = cookie_value(&response, SESSION_COOKIE).expect("session cookie is set");
        let session = self
            .state
            .sessions
            .get(&session_token)
            .await
            .unwrap()
            .expect("session is stored");

        TestUser {
            email: email.to_string(),
            session_token,
            csrf_token: session.csrf_token,
        }
    }

    /// Sends a JSON API request, with the CSRF header when a user is given.
    pub async fn api(
        &self,
        method: Method,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder
                .header(COOKIE, user.cookie())
                .header("x-csrf-token", &user.csrf_token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.send(builder.body(body).unwrap()).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// GET with optional cookies.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

/// Builds a urlencoded form POST.
pub fn form_request(uri: &str, fields: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).expect("form fields encode");

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Returns the value the response sets for a cookie, if any.
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookie(response, name).map(|cookie| cookie.value().to_string())
}

/// Returns the full `Set-Cookie` header for a cookie, if any.
pub fn set_cookie_header(response: &Response, name: &str) -> Option<String> {
    set_cookie(response, name).map(|cookie| cookie.to_string())
}

fn set_cookie(response: &Response, name: &str) -> Option<Cookie<'static>> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_owned()).ok())
        .find(|cookie| cookie.name() == name)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}
