//! HTTP API for the assistant

pub mod routes;
pub mod server;

pub use routes::AppState;
pub use server::{router, ApiServer, ApiServerConfig};
