//! # Ephemera REST
//!
//! REST API layer using Axum for Ephemera.
//! Provides the upload and retrieval endpoints, the legacy form routes and
//! health checks.

pub mod controllers;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
