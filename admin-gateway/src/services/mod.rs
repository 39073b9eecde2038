pub mod admin_client;
pub mod gateway;
pub mod metrics;
pub mod operations;
pub mod permission;
pub mod routes;
pub mod upload;
