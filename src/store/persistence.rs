//! Persistence layer for the project snapshot

use crate::error::StorageError;
use parking_lot::Mutex;
use std::path::Path;

/// Key under which the serialized project list is stored
pub const SNAPSHOT_KEY: &str = "mangaflow_projects";

/// Durable home of the serialized project list.
///
/// The whole list is one record: it is read once at startup and rewritten after
/// every mutation.
pub trait SnapshotPersistence: Send + Sync {
    /// Raw bytes of the last written snapshot, if any
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the stored snapshot. Need not be durable until [`flush`](Self::flush).
    fn save(&self, payload: &[u8]) -> Result<(), StorageError>;

    /// Force previously saved snapshots to stable storage
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Sled-based snapshot record
pub struct SledSnapshotStore {
    db: sled::Db,
}

impl SledSnapshotStore {
    /// Open (or create) a sled database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::Database(format!("Failed to open sled database: {}", e))
        })?;
        Ok(Self { db })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }
}

impl SnapshotPersistence for SledSnapshotStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self.db.get(SNAPSHOT_KEY.as_bytes()).map_err(|e| {
            StorageError::Database(format!("Failed to read project snapshot: {}", e))
        })?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    fn save(&self, payload: &[u8]) -> Result<(), StorageError> {
        self.db
            .insert(SNAPSHOT_KEY.as_bytes(), payload)
            .map_err(|e| {
                StorageError::Database(format!("Failed to write project snapshot: {}", e))
            })?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

/// In-process snapshot record, used by tests and ephemeral runs
#[derive(Default)]
pub struct MemorySnapshotStore {
    payload: Mutex<Option<Vec<u8>>>,
    writes: Mutex<usize>,
    flushes: Mutex<usize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the record as if a previous run had written `payload`
    pub fn with_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
            ..Self::default()
        }
    }

    pub fn payload(&self) -> Option<Vec<u8>> {
        self.payload.lock().clone()
    }

    /// Number of saves since construction
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }
}

impl SnapshotPersistence for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.payload.lock().clone())
    }

    fn save(&self, payload: &[u8]) -> Result<(), StorageError> {
        *self.payload.lock() = Some(payload.to_vec());
        *self.writes.lock() += 1;
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        *self.flushes.lock() += 1;
        Ok(())
    }
}
