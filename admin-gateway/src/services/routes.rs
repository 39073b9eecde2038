//! Maps each admin action onto the backend endpoint that performs it.

use crate::models::operation::OperationKind;
use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A resolved backend call. `path` is a list of raw segments below the base
/// URL; they are percent-encoded when the URL is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub kind: OperationKind,
    pub method: Method,
    pub path: Vec<String>,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl Endpoint {
    fn new(kind: OperationKind, method: Method, path: &[&str]) -> Self {
        Self {
            kind,
            method,
            path: path.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Human-readable `METHOD /a/b` used in logs.
    pub fn describe(&self) -> String {
        format!("{} /{}", self.method, self.path.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    List,
    Create(Value),
    Update { user_id: String, payload: Value },
    Promote(String),
    Demote(String),
    Delete(String),
}

impl UserAction {
    pub fn endpoint(&self) -> Endpoint {
        let kind = OperationKind::ManageUsers;
        match self {
            UserAction::List => Endpoint::new(kind, Method::GET, &["admin", "users"]),
            UserAction::Create(payload) => {
                Endpoint::new(kind, Method::POST, &["admin", "users"]).with_body(payload.clone())
            }
            UserAction::Update { user_id, payload } => {
                Endpoint::new(kind, Method::PUT, &["admin", "users", user_id.as_str()])
                    .with_body(payload.clone())
            }
            UserAction::Promote(user_id) => {
                Endpoint::new(kind, Method::POST, &["admin", "users", user_id.as_str(), "promote"])
            }
            UserAction::Demote(user_id) => {
                Endpoint::new(kind, Method::POST, &["admin", "users", user_id.as_str(), "demote"])
            }
            UserAction::Delete(user_id) => {
                Endpoint::new(kind, Method::DELETE, &["admin", "users", user_id.as_str()])
            }
        }
    }
}

/// Inclusive date range for analytics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalyticsRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(OperationKind::ViewAnalytics, Method::GET, &["admin", "analytics"])
            .with_query("start", self.start.format("%Y-%m-%d").to_string())
            .with_query("end", self.end.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentAction {
    List,
    Create(Value),
    Update(Value),
}

impl ContentAction {
    pub fn endpoint(&self) -> Endpoint {
        let kind = OperationKind::ManageContent;
        let path = ["admin", "content"];
        match self {
            ContentAction::List => Endpoint::new(kind, Method::GET, &path),
            ContentAction::Create(payload) => {
                Endpoint::new(kind, Method::POST, &path).with_body(payload.clone())
            }
            ContentAction::Update(payload) => {
                Endpoint::new(kind, Method::PUT, &path).with_body(payload.clone())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BillingAction {
    Get,
    Update(Value),
}

impl BillingAction {
    pub fn endpoint(&self) -> Endpoint {
        let kind = OperationKind::ManageBilling;
        let path = ["admin", "billing"];
        match self {
            BillingAction::Get => Endpoint::new(kind, Method::GET, &path),
            BillingAction::Update(payload) => {
                Endpoint::new(kind, Method::PUT, &path).with_body(payload.clone())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Users,
    Orders,
    Products,
    Analytics,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Users => "users",
            DataType::Orders => "orders",
            DataType::Products => "products",
            DataType::Analytics => "analytics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRequest {
    pub data_type: DataType,
    pub format: ExportFormat,
}

impl ExportRequest {
    pub fn new(data_type: DataType, format: ExportFormat) -> Self {
        Self { data_type, format }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(OperationKind::ExportData, Method::GET, &["admin", "export"])
            .with_query("type", self.data_type.as_str())
            .with_query("format", self.format.as_str())
    }
}

pub fn upload_endpoint() -> Endpoint {
    Endpoint::new(OperationKind::ManageContent, Method::POST, &["admin", "uploads"])
}
