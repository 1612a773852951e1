//! Service implementations.

mod image_service_impl;

pub use image_service_impl::{ImageServiceImpl, ImageSettings};
