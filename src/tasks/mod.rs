//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the server.
//!
//! # Tasks
//! - Cache eviction: deletes rendered images older than the TTL

mod evictor;

pub use evictor::{sweep_expired, CacheEvictor, EvictorHandle, EvictorState, SweepReport};
