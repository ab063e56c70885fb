//! HTTP handlers for invoicing-dashboard.

pub mod app;
pub mod auth;
pub mod invoices;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

pub const HX_REQUEST_HEADER: &str = "hx-request";
pub const HX_REDIRECT_HEADER: &str = "hx-redirect";

/// Send the browser to `to`. HTMX requests get an `HX-Redirect` header,
/// plain form posts a 303.
pub fn navigate(headers: &HeaderMap, to: &str) -> Response {
    if headers.contains_key(HX_REQUEST_HEADER) {
        (StatusCode::OK, [(HX_REDIRECT_HEADER, to)], "").into_response()
    } else {
        Redirect::to(to).into_response()
    }
}
