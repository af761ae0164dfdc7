//! Web API module for Chirp.
//!
//! A JSON REST API over axum: routing, middleware (JWT guard, CORS, rate
//! limiting, security headers), DTOs and handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
