//! # HTTP Server Module
//!
//! Axum server exposing the apple statistics store.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/apples/upload` - CSV upload (multipart, field `file`)
//! - `/api/v1/apples/records` - List records, bulk update
//! - `/api/v1/apples/records/:marketing_year` - Read or replace one record

pub mod apple_routes;
pub mod config;
pub mod errors;
pub mod server;

pub use apple_routes::AppleState;
pub use config::{HttpServerConfig, ImportMode};
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::{HttpServer, API_PREFIX};
