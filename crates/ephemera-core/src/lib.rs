//! # Ephemera Core
//!
//! Core types, traits, and error definitions for Ephemera.
//! This crate provides the image record, key generation, the injectable
//! clock and the error type shared by every layer.

pub mod clock;
pub mod domain;
pub mod error;
pub mod key;
pub mod result;
pub mod telemetry;

pub use clock::*;
pub use domain::*;
pub use error::*;
pub use key::*;
pub use result::*;
