//! Domain models for invoicing-dashboard.

mod invoice;
mod user;

pub use invoice::{Invoice, InvoiceChanges, InvoiceStatus, InvoiceSummary, NewInvoice};
pub use user::{AuthenticatedUser, User};
