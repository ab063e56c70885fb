use serde::Deserialize;
use std::fmt;

use crate::services::identity::Credentials;
use crate::utils::password::Password;

/// Login form submission.
#[derive(Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Where to land after signing in. Only same-site paths are honored.
    #[serde(default, rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"***")
            .field("redirect_to", &self.redirect_to)
            .finish()
    }
}

impl LoginForm {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: Password::new(self.password.clone()),
        }
    }

    /// Post-login destination, defaulting to the dashboard.
    pub fn destination(&self) -> &str {
        match self.redirect_to.as_deref() {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
            _ => "/dashboard",
        }
    }
}

/// Body returned when sign-in is refused.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginErrorResponse {
    pub message: &'static str,
}
