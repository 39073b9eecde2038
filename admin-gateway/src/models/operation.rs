//! Descriptors and outcomes of privileged operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// The closed set of privileged actions the admin backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    ManageUsers,
    ViewAnalytics,
    ManageContent,
    ManageBilling,
    ExportData,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ManageUsers => "manage-users",
            OperationKind::ViewAnalytics => "view-analytics",
            OperationKind::ManageContent => "manage-content",
            OperationKind::ManageBilling => "manage-billing",
            OperationKind::ExportData => "export-data",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub require_admin: bool,
    pub require_role: Option<String>,
    timeout: Duration,
}

impl OperationRequest {
    /// Every admin operation requires the admin role unless relaxed.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            require_admin: true,
            require_role: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn require_admin(mut self, require_admin: bool) -> Self {
        self.require_admin = require_admin;
        self
    }

    pub fn require_role(mut self, role: impl Into<String>) -> Self {
        self.require_role = Some(role.into());
        self
    }

    /// Zero is raised to one millisecond so the deadline is always positive.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn timeout_ms(&self) -> u128 {
        self.timeout.as_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    Timeout,
    Upstream,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "Unauthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Upstream => "Upstream",
            ErrorKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a gateway call. Either data or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult<T> {
    Success {
        data: T,
    },
    Failure {
        #[serde(rename = "errorKind")]
        kind: ErrorKind,
        #[serde(rename = "errorMessage")]
        message: String,
    },
}

impl<T> OperationResult<T> {
    pub fn success(data: T) -> Self {
        OperationResult::Success { data }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        OperationResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            OperationResult::Success { data } => Some(data),
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            OperationResult::Success { data } => Some(data),
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            OperationResult::Success { .. } => None,
            OperationResult::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            OperationResult::Success { .. } => None,
            OperationResult::Failure { message, .. } => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        match self {
            OperationResult::Success { data } => OperationResult::Success { data: f(data) },
            OperationResult::Failure { kind, message } => {
                OperationResult::Failure { kind, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request = OperationRequest::new(OperationKind::ViewAnalytics);
        assert!(request.require_admin);
        assert!(request.require_role.is_none());
        assert_eq!(request.timeout_ms(), 30_000);
    }

    #[test]
    fn test_zero_timeout_is_raised() {
        let request = OperationRequest::new(OperationKind::ExportData).with_timeout(Duration::ZERO);
        assert_eq!(request.timeout(), Duration::from_millis(1));
        assert_eq!(request.timeout_ms(), 1);
    }

    #[test]
    fn test_timeout_is_kept_when_positive() {
        let request = OperationRequest::new(OperationKind::ManageUsers)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(request.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(OperationKind::ManageUsers).unwrap(),
            json!("manage-users")
        );
        assert_eq!(OperationKind::ExportData.to_string(), "export-data");
    }

    #[test]
    fn test_result_serializes_for_ui() {
        let ok: OperationResult<serde_json::Value> = OperationResult::success(json!({"users": []}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"data": {"users": []}})
        );

        let err: OperationResult<serde_json::Value> =
            OperationResult::failure(ErrorKind::Upstream, "db down");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"errorKind": "Upstream", "errorMessage": "db down"})
        );
    }

    #[test]
    fn test_result_accessors() {
        let ok = OperationResult::success(7);
        assert!(ok.is_success());
        assert_eq!(ok.data(), Some(&7));
        assert_eq!(ok.error_kind(), None);
        assert_eq!(ok.map(|v| v * 2).into_data(), Some(14));

        let err: OperationResult<i32> = OperationResult::failure(ErrorKind::Timeout, "slow");
        assert!(!err.is_success());
        assert_eq!(err.data(), None);
        assert_eq!(err.error_kind(), Some(ErrorKind::Timeout));
        assert_eq!(err.error_message(), Some("slow"));
    }
}
