//! Storage seams for invoices and users.

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Invoice, InvoiceChanges, NewInvoice, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => AppError::from(e),
        }
    }
}

/// Statements against the `invoices` table. Each call is one round trip.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a row and return its server-assigned id.
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<Uuid, StoreError>;

    /// Update customer, amount and status of `id`. Returns rows affected.
    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, StoreError>;

    /// Unconditional delete. Returns rows affected.
    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError>;

    /// All invoices, newest first.
    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
