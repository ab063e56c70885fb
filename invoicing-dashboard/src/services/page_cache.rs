//! Cache of rendered pages, keyed by route path.
//!
//! Each path carries a generation that every invalidation bumps. A renderer
//! reads the generation before querying the store and may only fill the
//! cache if no invalidation happened in between, so a slow read can never
//! put back a page that a mutation already made stale.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub body: String,
    pub rendered_at: DateTime<Utc>,
}

pub trait PageCache: Send + Sync {
    fn get(&self, path: &str) -> Option<CachedPage>;

    /// Current generation of `path`. Read it before rendering.
    fn generation(&self, path: &str) -> u64;

    /// Store `body` only if `path` is still at `generation`.
    /// Returns whether the page was stored.
    fn put_if_generation(&self, path: &str, generation: u64, body: String) -> bool;

    /// Mark `path` stale so the next read re-renders it.
    fn invalidate(&self, path: &str);
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    page: Option<CachedPage>,
}

#[derive(Debug, Default)]
pub struct InMemoryPageCache {
    slots: DashMap<String, Slot>,
}

impl InMemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.page.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCache for InMemoryPageCache {
    fn get(&self, path: &str) -> Option<CachedPage> {
        self.slots.get(path).and_then(|slot| slot.page.clone())
    }

    fn generation(&self, path: &str) -> u64 {
        self.slots.get(path).map(|slot| slot.generation).unwrap_or(0)
    }

    fn put_if_generation(&self, path: &str, generation: u64, body: String) -> bool {
        let mut slot = self.slots.entry(path.to_string()).or_default();
        if slot.generation != generation {
            tracing::debug!(
                path,
                rendered_for = generation,
                current = slot.generation,
                "Discarding page rendered before an invalidation"
            );
            return false;
        }

        slot.page = Some(CachedPage {
            body,
            rendered_at: Utc::now(),
        });
        true
    }

    fn invalidate(&self, path: &str) {
        let mut slot = self.slots.entry(path.to_string()).or_default();
        slot.generation += 1;
        if slot.page.take().is_some() {
            tracing::debug!(path, generation = slot.generation, "Page cache entry invalidated");
        }
    }
}
