//! Parse-once cache of comments keyed by source unit and start offset.

use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::model::Comment;
use crate::source::SourceId;

/// Two-level cache: one partition per [`SourceId`], one entry per comment start.
///
/// The first value stored for a key becomes canonical and is never replaced.
/// Readers always receive a clone of it, never a reference. Partitions live
/// until whoever owns the source unit calls [`evict`](Self::evict).
#[derive(Debug, Default)]
pub struct CommentCache {
    partitions: DashMap<SourceId, FxHashMap<u32, Comment>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    discarded: AtomicUsize,
}

impl CommentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the canonical comment for `(unit, offset)`, if stored.
    pub fn get(&self, unit: SourceId, offset: u32) -> Option<Comment> {
        let partition = self.partitions.get(&unit)?;
        partition.get(&offset).cloned()
    }

    /// Stores `comment` as canonical unless the key already has a value.
    ///
    /// Returns a clone of whatever is canonical once the call completes, so a
    /// caller that lost a race gets the winner's value.
    pub fn put(&self, unit: SourceId, offset: u32, comment: Comment) -> Comment {
        let mut partition = self.partitions.entry(unit).or_default();
        match partition.entry(offset) {
            Entry::Occupied(existing) => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    unit = unit.as_u32(),
                    offset,
                    "discarding comment parsed concurrently for a cached range"
                );
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(comment).clone(),
        }
    }

    /// Returns the cached comment or runs `parse` and stores its result.
    ///
    /// `parse` runs without holding any lock. Concurrent misses on the same key
    /// may each parse, but only the first stored result becomes canonical.
    pub fn get_or_parse<E>(
        &self,
        unit: SourceId,
        offset: u32,
        parse: impl FnOnce() -> Result<Comment, E>,
    ) -> Result<Comment, E> {
        if let Some(comment) = self.get(unit, offset) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(unit = unit.as_u32(), offset, "comment cache hit");
            return Ok(comment);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let parsed = parse()?;
        Ok(self.put(unit, offset, parsed))
    }

    pub fn contains(&self, unit: SourceId, offset: u32) -> bool {
        self.partitions
            .get(&unit)
            .is_some_and(|partition| partition.contains_key(&offset))
    }

    /// Drops the partition of a source unit. Returns `true` if one existed.
    pub fn evict(&self, unit: SourceId) -> bool {
        let removed = self.partitions.remove(&unit);
        if let Some((_, partition)) = &removed {
            tracing::debug!(
                unit = unit.as_u32(),
                entries = partition.len(),
                "evicted comment cache partition"
            );
        }
        removed.is_some()
    }

    pub fn clear(&self) {
        self.partitions.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            units: self.partitions.len(),
            entries: self.partitions.iter().map(|p| p.value().len()).sum(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Source units with at least one cached comment.
    pub units: usize,
    /// Cached comments across all units.
    pub entries: usize,
    /// Lookups served from the cache.
    pub hits: usize,
    /// Lookups that had to parse.
    pub misses: usize,
    /// Parse results dropped because another parse stored first.
    pub discarded: usize,
}
