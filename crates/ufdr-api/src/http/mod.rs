//! HTTP layer for UFDR.
//!
//! Axum router with the liveness endpoint and the per-report chat route,
//! CORS enabled for the web frontend.

pub mod error;
pub mod handlers;
pub mod router;
