//! HTTP API for the booking backend.
//!
//! Routes are nested under `/api/`. Protected routes require a bearer
//! session; public routes (health, services, reviews listing, chat)
//! accept one when presented.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ServerError};
pub use types::ApiContext;
