use crate::models::operation::ErrorKind;
use thiserror::Error;

/// Failure raised by an operation body before it is folded into an
/// [`OperationResult`](crate::OperationResult).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GatewayError {
    /// Network and HTTP failures are upstream; everything else is unknown.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Network(_) | GatewayError::Upstream { .. } => ErrorKind::Upstream,
            GatewayError::Decode(_) | GatewayError::Rejected(_) | GatewayError::Other(_) => {
                ErrorKind::Unknown
            }
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Upstream {
            status,
            message: message.into(),
        }
    }
}

/// Reason a permission check refused a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionDenied {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),
}

impl PermissionDenied {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PermissionDenied::Unauthenticated => ErrorKind::Unauthenticated,
            PermissionDenied::Forbidden(_) => ErrorKind::Forbidden,
        }
    }
}
