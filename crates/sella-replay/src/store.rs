//! Recording persistence.
//!
//! Recordings serialize through JSON so stored blobs stay inspectable and
//! versionable by hand. [`RecordingStore`] is the seam between the replay
//! stack and whatever backend holds the bytes; [`MemoryStore`] is the
//! in-process implementation used by tests and single-machine sessions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recorder::Recording;

/// Errors from saving or loading recordings.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No recording exists under the requested id.
    #[error("no recording stored under id {0:?}")]
    NotFound(String),
    /// The recording could not be serialized or deserialized.
    #[error("recording serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Opaque identifier for a stored recording, assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingId(pub String);

impl std::fmt::Display for RecordingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage backend for finalized recordings.
pub trait RecordingStore {
    /// Persists a recording and returns the id it was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] when the recording cannot be
    /// encoded.
    fn save(&mut self, recording: &Recording) -> Result<RecordingId, StoreError>;

    /// Loads the recording stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::Serialize`] when the stored bytes fail to decode.
    fn load(&self, id: &RecordingId) -> Result<Recording, StoreError>;
}

/// In-memory store with sequentially assigned ids. Holds serialized bytes
/// rather than live structs, so load exercises the same decode path as any
/// on-disk backend would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<RecordingId, Vec<u8>>,
    next_id: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored recordings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no recordings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordingStore for MemoryStore {
    fn save(&mut self, recording: &Recording) -> Result<RecordingId, StoreError> {
        let bytes = serde_json::to_vec(recording)?;
        let id = RecordingId(format!("rec-{:04}", self.next_id));
        self.next_id += 1;
        tracing::debug!(id = %id, bytes = bytes.len(), "recording saved");
        self.entries.insert(id.clone(), bytes);
        Ok(id)
    }

    fn load(&self, id: &RecordingId) -> Result<Recording, StoreError> {
        let bytes = self
            .entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))?;
        Ok(serde_json::from_slice(bytes)?)
    }
}
