//! service-core: Shared infrastructure for the dashboard services.
pub mod error;
pub mod middleware;
pub mod observability;
