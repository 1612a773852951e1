//! Fast cache tier.
//!
//! A volatile, non-authoritative mirror of the repository. Entries may vanish
//! at any time; callers treat every failure as a miss.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::ImageCache;
pub use memory_cache::MemoryImageCache;
pub use redis_cache::{create_redis_pool, RedisImageCache};
