//! Services module for invoicing-dashboard.

pub mod auth_gateway;
pub mod database;
pub mod identity;
pub mod invoices;
pub mod metrics;
pub mod page_cache;
pub mod store;

pub use auth_gateway::{AuthGateway, AuthOutcome};
pub use database::Database;
pub use identity::{CredentialsProvider, IdentityVerifier};
pub use invoices::{Effect, InvoiceMutationService, MutationOutcome};
pub use metrics::{get_metrics, init_metrics};
pub use page_cache::{InMemoryPageCache, PageCache};
pub use store::{InvoiceStore, StoreError, UserStore};
