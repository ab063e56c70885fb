//! Shared fixtures for router-level tests. No database required.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use invoicing_dashboard::config::SessionSettings;
use invoicing_dashboard::models::{Invoice, InvoiceChanges, NewInvoice, User};
use invoicing_dashboard::services::{
    CredentialsProvider, InMemoryPageCache, InvoiceStore, StoreError, UserStore,
};
use invoicing_dashboard::utils::password::{hash_password, Password};
use invoicing_dashboard::{build_router, AppState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_EMAIL: &str = "user@nextmail.com";
pub const TEST_PASSWORD: &str = "123456";
pub const TEST_CUSTOMER_ID: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
pub const OTHER_CUSTOMER_ID: &str = "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa";

fn outage() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|_| {
        StoreError::Database(sqlx::Error::Protocol(format!(
            "invalid input syntax for type uuid: \"{}\"",
            value
        )))
    })
}

/// `invoices` table kept in memory, with a switch to simulate an outage.
#[derive(Default)]
pub struct MemoryInvoiceStore {
    rows: Mutex<Vec<Invoice>>,
    statements: Mutex<Vec<String>>,
    down: AtomicBool,
}

impl MemoryInvoiceStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Invoice> {
        self.rows.lock().unwrap().clone()
    }

    pub fn seed(&self, invoice: Invoice) {
        self.rows.lock().unwrap().push(invoice);
    }

    /// Kinds of statements issued so far, e.g. `["insert", "delete"]`.
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn begin(&self, kind: &str) -> Result<(), StoreError> {
        self.statements.lock().unwrap().push(kind.to_string());
        if self.down.load(Ordering::SeqCst) {
            Err(outage())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<Uuid, StoreError> {
        self.begin("insert")?;
        let row = Invoice {
            id: Uuid::new_v4(),
            customer_id: parse_uuid(&invoice.customer_id)?,
            amount: invoice.amount_in_cents,
            status: invoice.status.as_str().to_string(),
            date: invoice.date,
        };
        let id = row.id;
        self.rows.lock().unwrap().push(row);
        Ok(id)
    }

    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, StoreError> {
        self.begin("update")?;
        let id = parse_uuid(id)?;
        let customer_id = parse_uuid(&changes.customer_id)?;

        let mut rows = self.rows.lock().unwrap();
        let mut affected = 0;
        for row in rows.iter_mut().filter(|row| row.id == id) {
            row.customer_id = customer_id;
            row.amount = changes.amount_in_cents;
            row.status = changes.status.as_str().to_string();
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError> {
        self.begin("delete")?;
        let id = parse_uuid(id)?;

        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok((before - rows.len()) as u64)
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(outage());
        }
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(outage())
        } else {
            Ok(())
        }
    }
}

/// `users` table kept in memory.
pub struct MemoryUserStore {
    users: Vec<User>,
    down: AtomicBool,
}

impl MemoryUserStore {
    pub fn with_user(email: &str, password: &str) -> Self {
        let hash = hash_password(&Password::new(password)).expect("Failed to hash password");
        Self {
            users: vec![User {
                id: Uuid::new_v4(),
                name: "User".to_string(),
                email: email.to_string(),
                password: hash,
            }],
            down: AtomicBool::new(false),
        }
    }

    pub fn with_raw_hash(email: &str, stored: &str) -> Self {
        Self {
            users: vec![User {
                id: Uuid::new_v4(),
                name: "User".to_string(),
                email: email.to_string(),
                password: stored.to_string(),
            }],
            down: AtomicBool::new(false),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(outage());
        }
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }
}

pub struct TestApp {
    pub router: Router,
    pub invoices: Arc<MemoryInvoiceStore>,
    pub users: Arc<MemoryUserStore>,
    pub cache: Arc<InMemoryPageCache>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_users(MemoryUserStore::with_user(TEST_EMAIL, TEST_PASSWORD))
    }

    pub fn with_users(users: MemoryUserStore) -> Self {
        let invoices = Arc::new(MemoryInvoiceStore::default());
        Self::build(invoices.clone(), invoices, users)
    }

    /// Route invoice traffic through `store`, which wraps `invoices`.
    pub fn with_invoice_store(
        invoices: Arc<MemoryInvoiceStore>,
        store: Arc<dyn InvoiceStore>,
    ) -> Self {
        Self::build(
            invoices,
            store,
            MemoryUserStore::with_user(TEST_EMAIL, TEST_PASSWORD),
        )
    }

    fn build(
        invoices: Arc<MemoryInvoiceStore>,
        store: Arc<dyn InvoiceStore>,
        users: MemoryUserStore,
    ) -> Self {
        let users = Arc::new(users);
        let cache = Arc::new(InMemoryPageCache::new());

        let state = AppState::new(
            store,
            Arc::new(CredentialsProvider::new(users.clone())),
            cache.clone(),
        );
        let router = build_router(state, &SessionSettings::default());

        Self {
            router,
            invoices,
            users,
            cache,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(get_request(uri, cookie)).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(form_request(uri, cookie).body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_htmx(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(
            form_request(uri, cookie)
                .header("HX-Request", "true")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Sign in as the seeded user and return the session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .post_form(
                "/login",
                &format!("email={}&password={}", TEST_EMAIL, TEST_PASSWORD),
                None,
            )
            .await;
        session_cookie(&response).expect("Login did not set a session cookie")
    }
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn form_request(uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
}

/// `name=value` part of the response's session cookie.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
