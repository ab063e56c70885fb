//! Invoice form input and the state handed back to the form.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::InvoiceStatus;
use crate::utils::money;

pub const CUSTOMER_REQUIRED: &str = "Please select a customer.";
pub const AMOUNT_INVALID: &str = "Please enter an amount greater than $0.";
pub const STATUS_INVALID: &str = "Please select an invoice status.";

/// Raw invoice form submission. Absent fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InvoiceForm {
    #[serde(default, rename = "customerId")]
    #[validate(length(min = 1, message = "Please select a customer."))]
    pub customer_id: String,

    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub amount: String,

    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

fn rule_failed(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    // Checked after rounding: 0.004 is 0 cents.
    money::parse_amount(amount)
        .and_then(money::to_cents)
        .filter(|cents| *cents > 0)
        .map(|_| ())
        .ok_or_else(|| rule_failed("gt", AMOUNT_INVALID))
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    InvoiceStatus::parse(status)
        .map(|_| ())
        .ok_or_else(|| rule_failed("invalid_enum_value", STATUS_INVALID))
}

/// Invoice fields that passed the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInvoice {
    pub customer_id: String,
    pub amount_in_cents: i64,
    pub status: InvoiceStatus,
}

impl InvoiceForm {
    /// Run every field rule and collect all failures at once.
    pub fn into_validated(self) -> Result<ValidatedInvoice, FieldErrors> {
        self.validate().map_err(FieldErrors::from)?;

        let amount_in_cents = money::parse_amount(&self.amount).and_then(money::to_cents);
        let status = InvoiceStatus::parse(&self.status);

        match (amount_in_cents, status) {
            (Some(amount_in_cents), Some(status)) => Ok(ValidatedInvoice {
                customer_id: self.customer_id,
                amount_in_cents,
                status,
            }),
            (amount, status) => {
                let mut errors = FieldErrors::default();
                if amount.is_none() {
                    errors.push("amount", AMOUNT_INVALID);
                }
                if status.is_none() {
                    errors.push("status", STATUS_INVALID);
                }
                Err(errors)
            }
        }
    }
}

/// Field name → ordered messages, keyed by the form's field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(form_field_name(field).to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                fields.push(&field, message);
            }
        }
        fields
    }
}

/// Map struct field names to the names the form submits.
fn form_field_name(field: &str) -> &str {
    match field {
        "customer_id" => "customerId",
        other => other,
    }
}

/// What the form renders after a failed submission (or a delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub message: String,
}

impl FormState {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: message.into(),
        }
    }

    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors: Some(errors),
            message: message.into(),
        }
    }
}
