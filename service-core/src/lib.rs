//! service-core: shared infrastructure for the Eldonia-Nex admin crates.
pub mod config;
pub mod observability;

pub use reqwest;
pub use tracing;
