//! Rendering-identity hashes.
//!
//! The presentation layer correlates rendered nodes across layout passes
//! through these hashes: an unchanged hash after a re-layout means the node
//! only moved and does not need to be torn down and recreated.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// Identity key attached to every [`Placement`](crate::Placement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHash(pub u64);

/// Source of fresh rendering-identity hashes.
///
/// Injectable so tests can hand out deterministic hashes instead of the
/// process-wide default.
pub trait HashSource: Send + Sync {
    /// Returns a hash this source has never handed out before.
    fn next_hash(&self) -> RenderHash;
}

/// Default hash source mixing wall-clock time with a monotonic counter.
///
/// The counter guarantees distinct hashes even when two calls land in the
/// same clock tick.
#[derive(Debug, Default)]
pub struct SystemHashSource {
    counter: AtomicU64,
}

impl SystemHashSource {
    /// Creates a new source with its counter at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashSource for SystemHashSource {
    fn next_hash(&self) -> RenderHash {
        let mut hasher = DefaultHasher::new();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        nanos.hash(&mut hasher);
        self.counter.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);
        RenderHash(hasher.finish())
    }
}
