pub mod auth;
pub mod invoice;

pub use auth::{LoginErrorResponse, LoginForm};
pub use invoice::{FieldErrors, FormState, InvoiceForm, ValidatedInvoice};
