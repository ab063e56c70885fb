use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_sessions::Session;

use crate::handlers::navigate;

pub const LOGIN_PATH: &str = "/login";

pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_EMAIL: &str = "email";
pub const SESSION_NAME: &str = "name";

/// Signed-in user, read from the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let user_id: Option<String> = session.get(SESSION_USER_ID).await.unwrap_or(None);
        let email: Option<String> = session.get(SESSION_EMAIL).await.unwrap_or(None);

        match (user_id, email) {
            (Some(user_id), Some(email)) => {
                let name: Option<String> = session.get(SESSION_NAME).await.unwrap_or(None);
                Ok(SessionUser {
                    user_id,
                    email,
                    name,
                })
            }
            _ => Err(navigate(&parts.headers, LOGIN_PATH)),
        }
    }
}

/// Guard for dashboard routes: no session user, no entry.
pub async fn require_session(session: Session, request: Request<Body>, next: Next) -> Response {
    let user_id: Option<String> = session.get(SESSION_USER_ID).await.unwrap_or(None);

    if user_id.is_none() {
        tracing::debug!(path = %request.uri().path(), "No session, redirecting to login");
        return navigate(request.headers(), LOGIN_PATH);
    }

    next.run(request).await
}
