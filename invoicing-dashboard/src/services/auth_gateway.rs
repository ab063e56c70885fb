use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::AuthenticatedUser;
use crate::services::identity::{
    AuthErrorKind, Credentials, IdentityVerifier, SignInError, CREDENTIALS_PROVIDER,
};
use crate::services::metrics::record_login;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn(AuthenticatedUser),
    /// User-facing reason the sign-in was refused.
    Rejected(&'static str),
}

/// Maps the verifier's error taxonomy onto the two login-form messages.
/// Errors that are not authentication errors are returned untouched.
#[derive(Clone)]
pub struct AuthGateway {
    verifier: Arc<dyn IdentityVerifier>,
}

impl AuthGateway {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }

    #[instrument(skip(self, credentials))]
    pub async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<AuthOutcome> {
        match self
            .verifier
            .sign_in(CREDENTIALS_PROVIDER, credentials)
            .await
        {
            Ok(user) => {
                info!(user_id = %user.id, "User signed in");
                record_login("success");
                Ok(AuthOutcome::SignedIn(user))
            }
            Err(SignInError::Auth(err)) => {
                warn!(auth_error = %err.kind, "Sign-in refused");
                record_login(err.kind.as_str());
                let message = match err.kind {
                    AuthErrorKind::CredentialsSignin => INVALID_CREDENTIALS,
                    _ => SOMETHING_WENT_WRONG,
                };
                Ok(AuthOutcome::Rejected(message))
            }
            Err(SignInError::Other(err)) => Err(err),
        }
    }
}
