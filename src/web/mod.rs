//! HTTP API for the drive.
//!
//! Routes live under `/api`; `/health` and the Swagger UI sit at the root.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_health_router, create_router, create_swagger_router, ApiDoc};
pub use server::WebServer;
