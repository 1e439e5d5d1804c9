#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use sea_orm::{ConnectionTrait, DatabaseBackend as DbBackend, Statement};
use serde_json::{json, Value};
use shipdesk_api::{
    config::AppConfig,
    db::{self, DbConfig},
    AppState,
};
use tower::ServiceExt;

/// Helper harness for spinning up the full router backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "development".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = shipdesk_api::build_router(state.clone());

        Self { router, state }
    }

    /// Executes raw SQL against the test database.
    pub async fn execute_sql(&self, sql: &str) {
        self.state
            .db
            .execute(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
            .await
            .expect("raw sql should execute");
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn create_customer(&self, name: &str, phone: Option<&str>) -> Value {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/customers",
                Some(json!({ "name": name, "phone": phone, "address": "Kaiserstr. 12, Frankfurt" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create customer: {body}");
        body
    }

    pub async fn create_shipment(&self, destination: &str) -> Value {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/shipments",
                Some(json!({ "destination": destination })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create shipment: {body}");
        body
    }

    pub async fn get_customer(&self, id: i64) -> Value {
        let (status, body) = self
            .json(Method::GET, &format!("/api/customers/{id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "get customer: {body}");
        body
    }

    pub async fn get_shipment(&self, id: i64) -> Value {
        let (status, body) = self
            .json(Method::GET, &format!("/api/shipments/{id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "get shipment: {body}");
        body
    }

    pub async fn create_partial(&self, shipment_id: i64, payload: Value) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            &format!("/api/shipments/{shipment_id}/partial-shipments"),
            Some(payload),
        )
        .await
    }

    pub async fn close_shipment(&self, shipment_id: i64) -> Value {
        let (status, body) = self
            .json(
                Method::POST,
                &format!("/api/shipments/{shipment_id}/close"),
                Some(json!({ "driverName": "Samir", "driverVehicle": "Volvo FH 34-221" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "close shipment: {body}");
        body
    }

    /// Number of rows in `table`.
    pub async fn count_rows(&self, table: &str) -> i64 {
        let row = self
            .state
            .db
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                format!("SELECT COUNT(*) AS n FROM {table}"),
            ))
            .await
            .expect("count query should run")
            .expect("count query returns a row");
        row.try_get::<i64>("", "n").expect("count column")
    }
}

/// A valid partial shipment payload for `customer_id` with the given
/// packages and payment terms.
pub fn partial_payload(
    customer_id: i64,
    packages: Value,
    cost: f64,
    amount_paid: f64,
    status: &str,
    responsibility: &str,
) -> Value {
    json!({
        "customerId": customer_id,
        "receiverName": "Hadi",
        "receiverPhone": "+963 11 555 0100",
        "receiverAddress": "Damascus",
        "cost": cost,
        "amountPaid": amount_paid,
        "paymentStatus": status,
        "paymentResponsibility": responsibility,
        "packages": packages,
        "items": [
            { "weight": 5, "origin": "DE", "hscode": "8471.30", "amount": 2, "value": 250 }
        ]
    })
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id should be an integer")
}

/// Decimal values serialize as strings; normalise either form to f64.
pub fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().expect("finite number"),
        Value::String(s) => s.parse().expect("numeric string"),
        other => panic!("expected a number, got {other}"),
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response should be JSON")
    }
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
