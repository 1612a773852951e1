//! # Ephemera Service
//!
//! Write-through storage and read-triggered expiration of uploaded images
//! across a fast cache tier and the durable repository.

pub mod cache;
pub mod codec;
mod fail_open;
pub mod image_service;
pub mod metrics;
pub mod r#impl;

pub use cache::*;
pub use codec::*;
pub use image_service::*;
pub use r#impl::*;
