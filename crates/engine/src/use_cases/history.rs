//! History ledger use case.
//!
//! Bounded, newest-first record of successful generations, persisted as a
//! JSON array under one storage key and rehydrated at startup. Persistence
//! problems are logged and never surfaced: an unreadable payload is an
//! empty history, a failed write leaves the in-memory ledger authoritative
//! for the rest of the session.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use aistudio_domain::{GenerationId, GenerationResult};

use crate::infrastructure::ports::StoragePort;

/// Storage key shared with earlier builds of the studio.
pub const HISTORY_STORAGE_KEY: &str = "ai-history";
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

pub struct HistoryLedger {
    storage: Arc<dyn StoragePort>,
    key: String,
    capacity: usize,
    entries: RwLock<Vec<GenerationResult>>,
}

impl HistoryLedger {
    /// Rehydrate the ledger from `storage`.
    ///
    /// Stored entries beyond `capacity` are dropped from the tail, and later
    /// duplicates of an id are dropped. A capacity of zero is treated as one.
    pub fn load(storage: Arc<dyn StoragePort>, key: impl Into<String>, capacity: usize) -> Self {
        let key = key.into();
        let capacity = capacity.max(1);
        let entries = Self::read_entries(storage.as_ref(), &key, capacity);

        tracing::debug!(key = %key, entries = entries.len(), capacity, "History loaded");

        Self {
            storage,
            key,
            capacity,
            entries: RwLock::new(entries),
        }
    }

    /// Rehydrate from the default key with the default capacity.
    pub fn with_defaults(storage: Arc<dyn StoragePort>) -> Self {
        Self::load(storage, HISTORY_STORAGE_KEY, DEFAULT_HISTORY_CAPACITY)
    }

    fn read_entries(storage: &dyn StoragePort, key: &str, capacity: usize) -> Vec<GenerationResult> {
        let raw = match storage.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read history, starting empty");
                return Vec::new();
            }
        };

        let stored: Vec<GenerationResult> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Stored history is unreadable, starting empty");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut entries: Vec<GenerationResult> = stored
            .into_iter()
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect();
        entries.truncate(capacity);
        entries
    }

    /// Prepend `result`, evicting from the tail past capacity, and persist.
    ///
    /// An entry with the same id is replaced rather than duplicated.
    pub fn add(&self, result: GenerationResult) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let id = result.id.clone();

        entries.retain(|entry| entry.id != id);
        entries.insert(0, result);
        let evicted = entries.len().saturating_sub(self.capacity);
        entries.truncate(self.capacity);

        tracing::info!(
            generation_id = %id,
            entries = entries.len(),
            evicted,
            "Added generation to history"
        );

        self.persist(&entries);
    }

    /// Snapshot of the ledger, newest first.
    pub fn list(&self) -> Vec<GenerationResult> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, id: &GenerationId) -> Option<GenerationResult> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|entry| &entry.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry and the stored payload.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::error!(key = %self.key, error = %e, "Failed to clear stored history");
        }
    }

    fn persist(&self, entries: &[GenerationResult]) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to serialize history");
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.key, &json) {
            tracing::error!(key = %self.key, error = %e, "Failed to persist history");
        }
    }
}
