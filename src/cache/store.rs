//! In-memory response store with a revalidation window.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;

use super::keys::ResponseKey;
use super::lock::mutex_lock;

/// Cached HTTP response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

struct Entry {
    stored_at: Instant,
    response: CachedResponse,
}

/// Outcome of a lookup.
#[derive(Debug)]
pub enum Lookup {
    Hit(CachedResponse),
    Miss,
    /// The entry outlived the window and was dropped.
    Expired,
}

/// Rendered pages reused until `revalidate` has elapsed since they were stored.
pub struct ResponseStore {
    entries: Mutex<LruCache<ResponseKey, Entry>>,
    revalidate: Duration,
}

impl ResponseStore {
    pub fn new(capacity: NonZeroUsize, revalidate: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            revalidate,
        }
    }

    pub fn lookup(&self, key: &ResponseKey) -> Lookup {
        self.lookup_at(key, Instant::now())
    }

    pub(crate) fn lookup_at(&self, key: &ResponseKey, now: Instant) -> Lookup {
        let mut entries = mutex_lock(&self.entries, "lookup");
        let fresh = match entries.peek(key) {
            None => return Lookup::Miss,
            Some(entry) => now.saturating_duration_since(entry.stored_at) < self.revalidate,
        };

        if fresh {
            match entries.get(key) {
                Some(entry) => Lookup::Hit(entry.response.clone()),
                None => Lookup::Miss,
            }
        } else {
            entries.pop(key);
            Lookup::Expired
        }
    }

    /// Store a response, returning the key evicted to make room, if any.
    pub fn insert(&self, key: ResponseKey, response: CachedResponse) -> Option<ResponseKey> {
        self.insert_at(key, response, Instant::now())
    }

    pub(crate) fn insert_at(
        &self,
        key: ResponseKey,
        response: CachedResponse,
        now: Instant,
    ) -> Option<ResponseKey> {
        let entry = Entry {
            stored_at: now,
            response,
        };
        mutex_lock(&self.entries, "insert")
            .push(key.clone(), entry)
            .map(|(evicted, _)| evicted)
            .filter(|evicted| *evicted != key)
    }

    /// Drop every variant cached for `path`. Returns how many were removed.
    pub fn invalidate_path(&self, path: &str) -> usize {
        let mut entries = mutex_lock(&self.entries, "invalidate_path");
        let doomed: Vec<ResponseKey> = entries
            .iter()
            .filter(|(key, _)| key.path == path)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        doomed.len()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
