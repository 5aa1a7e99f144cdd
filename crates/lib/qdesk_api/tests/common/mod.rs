//! Shared harness: the full router over the in-memory store.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use qdesk_api::{AppState, config::ApiConfig};
use qdesk_core::auth::SessionIssuer;
use qdesk_core::store::Stores;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub sessions: SessionIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        let stores = Stores::in_memory();
        let state = AppState::new(stores.clone(), ApiConfig::with_secret(TEST_SECRET));
        let sessions = state.sessions.clone();
        Self {
            router: qdesk_api::router(state),
            stores,
            sessions,
        }
    }

    /// Send one request and return the status and the parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    /// Register a citizen and return their ID.
    pub async fn register(&self, name: &str, national_id: &str) -> String {
        let (status, json) = self
            .post("/api/auth/register", None, registration(name, national_id))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_str().expect("id").to_string()
    }

    /// Log a citizen in and return the session token.
    pub async fn citizen_login(&self, id: &str, national_id: &str) -> String {
        let (status, json) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "id": id, "nationalId": national_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["data"]["token"].as_str().expect("token").to_string()
    }

    /// Sign up an account and return its session token. The first account
    /// signed up on a fresh app is the admin.
    pub async fn signup(&self, email: &str) -> String {
        let (status, json) = self
            .post(
                "/api/accounts/signup",
                None,
                json!({ "name": "Desk Officer", "email": email, "password": "secret123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["token"].as_str().expect("token").to_string()
    }

    /// Create a department as `admin_token` and return its ID.
    pub async fn department(&self, admin_token: &str, name: &str) -> String {
        let (status, json) = self
            .post(
                "/api/departments/manage",
                Some(admin_token),
                json!({ "action": "create", "data": { "name": name, "staffCapacity": 3 } }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["data"]["id"].as_str().expect("id").to_string()
    }
}

pub fn registration(name: &str, national_id: &str) -> Value {
    json!({
        "name": name,
        "nationalId": national_id,
        "contactDetails": { "phone": "0300-1234567" },
        "address": {
            "street": "House 7, Street 12",
            "city": "Lahore",
            "province": "Punjab",
            "postalCode": "54000"
        },
        "purpose": "CNIC renewal"
    })
}
