pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

pub use startup::{build_router, Application};

use services::{
    AuthGateway, IdentityVerifier, InvoiceMutationService, InvoiceStore, PageCache,
};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub invoices: InvoiceMutationService,
    pub invoice_store: Arc<dyn InvoiceStore>,
    pub auth: AuthGateway,
    pub page_cache: Arc<dyn PageCache>,
}

impl AppState {
    pub fn new(
        invoice_store: Arc<dyn InvoiceStore>,
        verifier: Arc<dyn IdentityVerifier>,
        page_cache: Arc<dyn PageCache>,
    ) -> Self {
        Self {
            invoices: InvoiceMutationService::new(invoice_store.clone()),
            invoice_store,
            auth: AuthGateway::new(verifier),
            page_cache,
        }
    }
}
