//! # Ephemera Repository
//!
//! Durable, authoritative storage for uploaded images.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn ImageRepository>    (store interface)
//! SqliteImageRepository            (SQLx / SQLite)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! SQLite
//! ```

pub mod pool;
pub mod sqlite;
pub mod traits;

pub use pool::*;
pub use sqlite::*;
pub use traits::*;
