//! # Ephemera Server Library
//!
//! Object graph construction and startup utilities for the Ephemera server.

pub mod di;
pub mod startup;
