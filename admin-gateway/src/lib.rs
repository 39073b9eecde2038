//! admin-gateway: permission-checked, time-bounded access to the
//! Eldonia-Nex admin backend.
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod startup;

pub use error::GatewayError;
pub use models::operation::{ErrorKind, OperationKind, OperationRequest, OperationResult};
pub use models::session::{Session, SessionProvider, StaticSessionProvider};
pub use services::gateway::{GatewayStatus, OperationGateway};
pub use services::operations::AdminOperations;
pub use services::permission::PermissionChecker;
