//! `docrag-server` exposes a docrag pipeline over HTTP.
//!
//! `POST /chat` answers a question, `GET /health` reports readiness and
//! `GET /` is a liveness check.

#![warn(missing_docs)]

pub mod error;
pub mod protocol;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, ServerConfig, app_router, run_server};
