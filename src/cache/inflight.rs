//! In-flight Render Coordination
//!
//! Collapses concurrent generations of the same cache key into one. The first
//! request for a key runs the generation; requests arriving while it runs
//! await the same image bytes instead of fetching and rendering again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::cache::CacheKey;
use crate::error::Result;

/// Image bytes produced by one generation, shared by every caller that
/// waited on it.
pub type SharedImage = Arc<Vec<u8>>;

type Slot = Arc<OnceCell<Result<SharedImage>>>;

/// Outcome of [`InFlight::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flight {
    /// Shared generation result
    pub result: Result<SharedImage>,
    /// True when this caller waited on a generation another caller started
    pub coalesced: bool,
}

// == In-flight Map ==
/// Map from cache key to the pending generation for that key.
#[derive(Debug, Default)]
pub struct InFlight {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `generate` for `key` unless a generation is already pending, in
    /// which case waits for that one.
    ///
    /// If the caller running the generation is dropped before it finishes,
    /// one of the waiters runs `generate` in its place.
    pub async fn run<F, Fut>(&self, key: &CacheKey, generate: F) -> Flight
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SharedImage>>,
    {
        let (slot, joined) = {
            let mut slots = self.slots.lock();
            match slots.get(key) {
                Some(slot) => (Arc::clone(slot), true),
                None => {
                    let slot: Slot = Arc::new(OnceCell::new());
                    slots.insert(key.clone(), Arc::clone(&slot));
                    (slot, false)
                }
            }
        };
        let guard = SlotGuard {
            owner: self,
            key,
            slot,
        };

        let mut ran = false;
        let result = guard
            .slot
            .get_or_init(|| {
                ran = true;
                generate()
            })
            .await
            .clone();

        Flight {
            result,
            coalesced: joined && !ran,
        }
    }

    /// Number of keys with a pending or just-finished generation.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drops the map entry once the generation finished or its last waiter left.
struct SlotGuard<'a> {
    owner: &'a InFlight,
    key: &'a CacheKey,
    slot: Slot,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.owner.slots.lock();
        let Some(current) = slots.get(self.key) else {
            return;
        };
        if !Arc::ptr_eq(current, &self.slot) {
            return;
        }
        // map + this guard
        if self.slot.initialized() || Arc::strong_count(&self.slot) <= 2 {
            slots.remove(self.key);
        }
    }
}
