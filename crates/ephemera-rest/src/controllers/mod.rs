//! REST API controllers.

pub mod health_controller;
pub mod image_controller;

pub use health_controller::*;
