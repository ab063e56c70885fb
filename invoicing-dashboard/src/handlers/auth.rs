use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use service_core::error::AppError;
use tower_sessions::Session;

use crate::dtos::{LoginErrorResponse, LoginForm};
use crate::handlers::navigate;
use crate::middleware::auth::{LOGIN_PATH, SESSION_EMAIL, SESSION_NAME, SESSION_USER_ID};
use crate::services::AuthOutcome;
use crate::AppState;

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::anyhow!("Session error: {}", e))
}

/// Credentials login. Refusals come back as a form message; anything the
/// gateway does not classify surfaces as a server error.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.auth.authenticate(&form.credentials()).await? {
        AuthOutcome::SignedIn(user) => {
            // Fresh session id on privilege change.
            session.cycle_id().await.map_err(session_error)?;
            session
                .insert(SESSION_USER_ID, user.id.to_string())
                .await
                .map_err(session_error)?;
            session
                .insert(SESSION_EMAIL, &user.email)
                .await
                .map_err(session_error)?;
            session
                .insert(SESSION_NAME, &user.name)
                .await
                .map_err(session_error)?;

            Ok(navigate(&headers, form.destination()))
        }
        AuthOutcome::Rejected(message) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(LoginErrorResponse { message }),
        )
            .into_response()),
    }
}

pub async fn logout_handler(session: Session, headers: HeaderMap) -> Result<Response, AppError> {
    session.flush().await.map_err(session_error)?;
    tracing::info!("User signed out");
    Ok(navigate(&headers, LOGIN_PATH))
}
