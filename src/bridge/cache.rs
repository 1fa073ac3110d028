//! Compute-once caches for resolved handles.
//!
//! Both caches share the same discipline: the resolution function runs without any lock held,
//! and its result is published atomically. If two threads race to fill the same entry, both
//! compute, the first publication wins, and both callers observe the published value. A failed
//! resolution publishes nothing, so the next call retries.
//!
//! # Key Components
//!
//! - [`CacheSlot`] - A single lazily resolved value
//! - [`CacheMap`] - Lazily resolved values keyed by lookup key
//! - [`CacheStats`] - Hit and fill counters of one cache

use std::{
    borrow::Borrow,
    fmt,
    hash::Hash,
    sync::{
        atomic::{AtomicUsize, Ordering},
        OnceLock,
    },
};

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, trace};

use crate::Result;

/// A single-assignment, lazily resolved cell.
///
/// # Examples
///
/// ```rust
/// use hostbridge::bridge::CacheSlot;
///
/// let slot = CacheSlot::new();
/// assert!(slot.get_or_try_init(|| Err(hostbridge::Error::LockError)).is_err());
/// assert!(!slot.is_resolved());
///
/// assert_eq!(*slot.get_or_try_init(|| Ok(7))?, 7);
/// assert_eq!(*slot.get_or_try_init(|| Ok(8))?, 7);
/// # Ok::<(), hostbridge::Error>(())
/// ```
pub struct CacheSlot<T> {
    cell: OnceLock<T>,
}

impl<T> CacheSlot<T> {
    /// Creates an unresolved slot
    #[must_use]
    pub const fn new() -> Self {
        CacheSlot {
            cell: OnceLock::new(),
        }
    }

    /// The resolved value, if any
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns `true` once a value has been published
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns the resolved value, running `resolve` if the slot is still unresolved.
    ///
    /// # Errors
    ///
    /// Returns the error of `resolve`; the slot stays unresolved.
    pub fn get_or_try_init<F>(&self, resolve: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }

        let value = resolve()?;
        Ok(self.cell.get_or_init(|| value))
    }
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Resolved").field(value).finish(),
            None => f.write_str("Unresolved"),
        }
    }
}

/// Counters of one cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of resolved entries
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: usize,
    /// Entries published by a resolution
    pub fills: usize,
}

/// A concurrent map of lazily resolved values.
///
/// Values are cloned out of the map; for `Arc`-backed handles every caller of the same key
/// holds the same allocation.
pub struct CacheMap<K, V> {
    name: &'static str,
    entries: DashMap<K, V>,
    hits: AtomicUsize,
    fills: AtomicUsize,
}

impl<K, V> CacheMap<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: Clone,
{
    /// Creates an empty cache; `name` appears in log records
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        CacheMap {
            name,
            entries: DashMap::new(),
            hits: AtomicUsize::new(0),
            fills: AtomicUsize::new(0),
        }
    }

    /// The cached value of `key`, without resolving
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the value of `key`, running `resolve` if it is not cached yet.
    ///
    /// # Errors
    ///
    /// Returns the error of `resolve`; nothing is cached.
    pub fn get_or_try_insert_with<Q, F>(&self, key: &Q, resolve: F) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + fmt::Debug + ?Sized,
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("{} cache hit: {:?}", self.name, key);
            return Ok(value);
        }

        let value = resolve()?;

        let published = match self.entries.entry(key.to_owned()) {
            Entry::Occupied(existing) => {
                trace!("{} cache lost fill race: {:?}", self.name, key);
                existing.get().clone()
            }
            Entry::Vacant(vacant) => {
                self.fills.fetch_add(1, Ordering::Relaxed);
                debug!("{} cache filled: {:?}", self.name, key);
                vacant.insert(value).value().clone()
            }
        };
        Ok(published)
    }

    /// Visits every cached value
    pub fn for_each(&self, mut visit: impl FnMut(&K, &V)) {
        for entry in &self.entries {
            visit(entry.key(), entry.value());
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            fills: self.fills.load(Ordering::Relaxed),
        }
    }
}
