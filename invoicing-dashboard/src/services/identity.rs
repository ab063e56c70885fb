//! Identity verification behind the login form.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationError};

use crate::models::AuthenticatedUser;
use crate::services::store::UserStore;
use crate::utils::password::{verify_password, Password, VerifyError};

pub const CREDENTIALS_PROVIDER: &str = "credentials";

const MIN_PASSWORD_LEN: usize = 6;

/// Authentication error subtype, exposed as the provider's `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    CredentialsSignin,
    AccessDenied,
    Configuration,
    CallbackRouteError,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialsSignin => "CredentialsSignin",
            AuthErrorKind::AccessDenied => "AccessDenied",
            AuthErrorKind::Configuration => "Configuration",
            AuthErrorKind::CallbackRouteError => "CallbackRouteError",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {reason}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    reason: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn credentials(reason: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::CredentialsSignin, reason)
    }
}

#[derive(Debug, Error)]
pub enum SignInError {
    /// A classified authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Anything else: store outages, bugs. Not an authentication verdict.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "password_long_enough"))]
    pub password: Password,
}

fn password_long_enough(password: &Password) -> Result<(), ValidationError> {
    if password.as_str().chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::new("length"))
    }
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn sign_in(
        &self,
        provider: &str,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, SignInError>;
}

/// Email/password provider backed by the `users` table.
pub struct CredentialsProvider {
    users: Arc<dyn UserStore>,
}

impl CredentialsProvider {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityVerifier for CredentialsProvider {
    #[instrument(skip(self, credentials))]
    async fn sign_in(
        &self,
        provider: &str,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, SignInError> {
        if provider != CREDENTIALS_PROVIDER {
            return Err(AuthError::new(
                AuthErrorKind::Configuration,
                format!("Unknown provider '{}'", provider),
            )
            .into());
        }

        if credentials.validate().is_err() {
            return Err(AuthError::credentials("Malformed credentials").into());
        }

        let user = self
            .users
            .find_user_by_email(&credentials.email)
            .await
            .map_err(|e| SignInError::Other(anyhow::anyhow!("Failed to fetch user: {}", e)))?
            .ok_or_else(|| AuthError::credentials("Unknown user"))?;

        match verify_password(&credentials.password, &user.password) {
            Ok(()) => {
                info!(user_id = %user.id, "Credentials accepted");
                Ok(AuthenticatedUser::from(user))
            }
            Err(VerifyError::Mismatch) => Err(AuthError::credentials("Password mismatch").into()),
            Err(VerifyError::MalformedHash) => {
                warn!(user_id = %user.id, "Stored password hash is malformed");
                Err(AuthError::new(
                    AuthErrorKind::CallbackRouteError,
                    "Stored password hash is malformed",
                )
                .into())
            }
        }
    }
}
