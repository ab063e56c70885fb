pub mod auth;
pub mod metrics;

pub use auth::{require_session, SessionUser};
pub use metrics::metrics_middleware;
