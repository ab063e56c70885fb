//! Invoice create/update/delete.
//!
//! Every operation returns data: validation and persistence failures become a
//! [`FormState`], and the cache/navigation side effects are returned as
//! [`Effect`]s for the web layer to carry out.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::dtos::{FormState, InvoiceForm};
use crate::models::{InvoiceChanges, NewInvoice};
use crate::services::metrics::record_mutation;
use crate::services::store::InvoiceStore;

pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Summary for any schema failure, create or update.
pub const MISSING_FIELDS: &str = "Missing Fields. Failed to Create Invoice.";
pub const CREATE_FAILED: &str = "Database Error: Failed to Create Invoice.";
pub const UPDATE_FAILED: &str = "Database Error: Failed to Update Invoice.";
pub const DELETE_FAILED: &str = "Database Error: Failed to Delete Invoice.";
pub const DELETED: &str = "Deleted Invoice.";

/// Side effect the caller must perform after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Drop the cached rendering of a route.
    Invalidate(&'static str),
    /// Send the browser to a route.
    Redirect(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The statement ran.
    Completed {
        state: Option<FormState>,
        effects: Vec<Effect>,
    },
    /// Input failed the schema; nothing was sent to the store.
    Rejected(FormState),
    /// The store failed; detail was logged and dropped.
    Failed(FormState),
}

impl MutationOutcome {
    pub fn effects(&self) -> &[Effect] {
        match self {
            MutationOutcome::Completed { effects, .. } => effects,
            _ => &[],
        }
    }

    pub fn state(&self) -> Option<&FormState> {
        match self {
            MutationOutcome::Completed { state, .. } => state.as_ref(),
            MutationOutcome::Rejected(state) | MutationOutcome::Failed(state) => Some(state),
        }
    }
}

#[derive(Clone)]
pub struct InvoiceMutationService {
    store: Arc<dyn InvoiceStore>,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl InvoiceMutationService {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self {
            store,
            today: utc_today,
        }
    }

    /// Replace the source of creation dates.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    #[instrument(skip(self, form))]
    pub async fn create(&self, form: InvoiceForm) -> MutationOutcome {
        let invoice = match form.into_validated() {
            Ok(invoice) => invoice,
            Err(errors) => {
                debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Invoice form rejected");
                record_mutation("create", "invalid");
                return MutationOutcome::Rejected(FormState::invalid(errors, MISSING_FIELDS));
            }
        };

        let new_invoice = NewInvoice {
            customer_id: invoice.customer_id,
            amount_in_cents: invoice.amount_in_cents,
            status: invoice.status,
            date: (self.today)(),
        };

        match self.store.insert_invoice(&new_invoice).await {
            Ok(id) => {
                info!(invoice_id = %id, "Invoice created");
                record_mutation("create", "success");
                MutationOutcome::Completed {
                    state: None,
                    effects: vec![
                        Effect::Invalidate(INVOICES_PATH),
                        Effect::Redirect(INVOICES_PATH),
                    ],
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to create invoice");
                record_mutation("create", "db_error");
                MutationOutcome::Failed(FormState::message(CREATE_FAILED))
            }
        }
    }

    /// Same schema and summary message as [`Self::create`].
    #[instrument(skip(self, form), fields(invoice_id = %id))]
    pub async fn update(&self, id: &str, form: InvoiceForm) -> MutationOutcome {
        let invoice = match form.into_validated() {
            Ok(invoice) => invoice,
            Err(errors) => {
                debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Invoice form rejected");
                record_mutation("update", "invalid");
                return MutationOutcome::Rejected(FormState::invalid(errors, MISSING_FIELDS));
            }
        };

        let changes = InvoiceChanges {
            customer_id: invoice.customer_id,
            amount_in_cents: invoice.amount_in_cents,
            status: invoice.status,
        };

        match self.store.update_invoice(id, &changes).await {
            Ok(rows) => {
                info!(rows_affected = rows, "Invoice updated");
                record_mutation("update", "success");
                MutationOutcome::Completed {
                    state: None,
                    effects: vec![
                        Effect::Invalidate(INVOICES_PATH),
                        Effect::Redirect(INVOICES_PATH),
                    ],
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to update invoice");
                record_mutation("update", "db_error");
                MutationOutcome::Failed(FormState::message(UPDATE_FAILED))
            }
        }
    }

    /// Unconditional: a missing row reads the same as a deleted one.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn delete(&self, id: &str) -> MutationOutcome {
        match self.store.delete_invoice(id).await {
            Ok(rows) => {
                info!(rows_affected = rows, "Invoice deleted");
                record_mutation("delete", "success");
                MutationOutcome::Completed {
                    state: Some(FormState::message(DELETED)),
                    effects: vec![Effect::Invalidate(INVOICES_PATH)],
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to delete invoice");
                record_mutation("delete", "db_error");
                MutationOutcome::Failed(FormState::message(DELETE_FAILED))
            }
        }
    }
}
