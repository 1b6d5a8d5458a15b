//! HTTP client for the link library API.

pub mod api;
pub mod middleware;
pub mod routes;

pub use api::ApiClient;
pub use routes::{AuthRoutes, EndpointPath};
