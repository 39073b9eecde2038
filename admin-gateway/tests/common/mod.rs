//! Test helpers: a fake admin backend served by axum on an ephemeral port.

#![allow(dead_code)]

use admin_gateway::config::{
    AuthorizationSettings, BackendSettings, OperationSettings, Settings, TelemetrySettings,
    UploadSettings,
};
use admin_gateway::{AdminOperations, Session, StaticSessionProvider};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const ADMIN_TOKEN: &str = "admin-access-token";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub file_name: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone, Default)]
struct BackendState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct TestBackend {
    pub address: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestBackend {
    pub async fn spawn() -> Self {
        let state = BackendState::default();
        let requests = state.requests.clone();

        let app = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test backend");
        let address = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { address, requests }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn settings(&self, enforce_authorization: bool) -> Settings {
        Settings {
            backend: BackendSettings::new(self.address.clone()),
            authorization: AuthorizationSettings {
                enforce_authorization,
            },
            operations: OperationSettings {
                timeout_ms: 500,
                export_timeout_ms: 2_000,
            },
            upload: UploadSettings::default(),
            telemetry: TelemetrySettings::default(),
        }
    }

    /// Operations wired to this backend with the given session.
    pub fn operations(
        &self,
        session: Option<Session>,
    ) -> (AdminOperations, Arc<StaticSessionProvider>) {
        let provider = Arc::new(StaticSessionProvider::new(session));
        let ops = AdminOperations::new(self.settings(true), provider.clone())
            .expect("Failed to build admin operations");
        (ops, provider)
    }
}

pub fn session(role: &str) -> Session {
    Session::new(
        format!("{}-user", role),
        role,
        ADMIN_TOKEN,
        Utc::now() + ChronoDuration::hours(1),
    )
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

async fn handle(
    State(state): State<BackendState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().map(|q| q.to_string());

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        authorization: header_value(&headers, "authorization"),
        request_id: header_value(&headers, "x-request-id"),
        file_name: header_value(&headers, "x-file-name"),
        body: body.to_vec(),
    });

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        (Method::GET, ["admin", "users"]) => Json(json!({
            "users": [
                {"id": "u1", "email": "ada@example.com", "role": "admin"},
                {"id": "u2", "email": "bob@example.com", "role": "user"}
            ]
        }))
        .into_response(),
        (Method::POST, ["admin", "users"]) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": {"code": "seat_quota", "message": "Seat quota exceeded"}
            })),
        )
            .into_response(),
        (Method::POST, ["admin", "users", id, action]) => Json(json!({
            "id": id,
            "action": action,
        }))
        .into_response(),
        (Method::DELETE, ["admin", "users", _id]) => StatusCode::NO_CONTENT.into_response(),
        (Method::GET, ["admin", "analytics"]) => Json(json!({
            "query": query,
            "visits": 1234,
            "orders": 56
        }))
        .into_response(),
        (Method::GET, ["admin", "content"]) => (
            [(header::CONTENT_TYPE, "text/html")],
            "<html>maintenance</html>",
        )
            .into_response(),
        (Method::POST, ["admin", "content"]) => {
            let payload: serde_json::Value =
                serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
            (StatusCode::CREATED, Json(json!({"created": payload}))).into_response()
        }
        (Method::PUT, ["admin", "content"]) => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"updated": true})).into_response()
        }
        (Method::GET, ["admin", "billing"]) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "db down"})),
        )
            .into_response(),
        (Method::PUT, ["admin", "billing"]) => {
            (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
        }
        (Method::GET, ["admin", "export"]) => {
            if query.as_deref().unwrap_or_default().contains("format=csv") {
                (
                    [(header::CONTENT_TYPE, "text/csv")],
                    "id,email\nu1,ada@example.com\n",
                )
                    .into_response()
            } else {
                Json(json!([{"id": "u1"}])).into_response()
            }
        }
        (Method::POST, ["admin", "uploads"]) => Json(json!({
            "file_name": header_value(&headers, "x-file-name"),
            "content_type": header_value(&headers, "content-type"),
            "size": body.len(),
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response(),
    }
}
