//! Cache Module
//!
//! Content-addressed on-disk cache of rendered images: key derivation, the
//! file store, in-flight generation tracking and request counters.

mod inflight;
mod key;
mod stats;
mod store;


// Re-export public types
pub use inflight::{Flight, InFlight, SharedImage};
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::{CacheStore, TEMP_PREFIX};
