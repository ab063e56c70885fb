//! Invoice page and form actions.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use service_core::error::AppError;

use crate::dtos::InvoiceForm;
use crate::handlers::navigate;
use crate::models::InvoiceSummary;
use crate::services::invoices::INVOICES_PATH;
use crate::services::{Effect, MutationOutcome};
use crate::AppState;

const CACHE_STATUS_HEADER: &str = "x-cache";

/// Invoice list, served from the page cache until a mutation invalidates it.
pub async fn list_invoices(State(state): State<AppState>) -> Result<Response, AppError> {
    if let Some(page) = state.page_cache.get(INVOICES_PATH) {
        return Ok((
            [
                ("content-type", "application/json"),
                (CACHE_STATUS_HEADER, "hit"),
            ],
            page.body,
        )
            .into_response());
    }

    let generation = state.page_cache.generation(INVOICES_PATH);
    let invoices: Vec<InvoiceSummary> = state
        .invoice_store
        .list_invoices()
        .await?
        .into_iter()
        .map(InvoiceSummary::from)
        .collect();

    let body = serde_json::to_string(&invoices)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to render invoices: {}", e)))?;
    state
        .page_cache
        .put_if_generation(INVOICES_PATH, generation, body.clone());

    Ok((
        [
            ("content-type", "application/json"),
            (CACHE_STATUS_HEADER, "miss"),
        ],
        body,
    )
        .into_response())
}

pub async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let outcome = state.invoices.create(form).await;
    respond(&state, &headers, outcome)
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let outcome = state.invoices.update(&id, form).await;
    respond(&state, &headers, outcome)
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.invoices.delete(&id).await;
    respond(&state, &headers, outcome)
}

/// Carry out the outcome's effects and render what is left for the form.
fn respond(state: &AppState, headers: &HeaderMap, outcome: MutationOutcome) -> Response {
    match outcome {
        MutationOutcome::Rejected(form_state) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(form_state)).into_response()
        }
        MutationOutcome::Failed(form_state) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(form_state)).into_response()
        }
        MutationOutcome::Completed {
            state: form_state,
            effects,
        } => {
            let mut redirect_to = None;
            for effect in effects {
                match effect {
                    Effect::Invalidate(path) => state.page_cache.invalidate(path),
                    Effect::Redirect(path) => redirect_to = Some(path),
                }
            }

            match (redirect_to, form_state) {
                (Some(path), _) => navigate(headers, path),
                (None, Some(form_state)) => (StatusCode::OK, Json(form_state)).into_response(),
                (None, None) => StatusCode::NO_CONTENT.into_response(),
            }
        }
    }
}
