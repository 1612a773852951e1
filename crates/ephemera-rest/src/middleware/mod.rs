//! HTTP middleware.

mod logging;

pub use logging::{logging_middleware, redacted_path, request_span};
