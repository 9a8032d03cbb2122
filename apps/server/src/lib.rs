//! # oaxaca-server
//!
//! HTTP service for the restaurant floor. Handlers are thin: they decode
//! JSON, call one `oaxaca-db` handle, and map errors through [`ApiError`].
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (defaults, TOML, environment)
//! - [`state`] - Shared handler state
//! - [`routes`] - axum router and handlers
//! - [`dispatcher`] - Periodic waiter assignment
//! - [`error`] - API error type and HTTP mapping

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::build_router;
pub use state::AppState;
