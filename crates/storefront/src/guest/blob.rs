//! Key-value blob storage for guest lists.
//!
//! Guest lists are persisted as one serialized value per key. A `set`
//! replaces the whole value, so a reader sees either the old list or the new
//! one, never a mix.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;
use tower_sessions::Session;

/// Errors from the underlying storage primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Storage could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The value is larger than the store accepts.
    #[error("storage quota exceeded ({attempted} bytes, limit {limit})")]
    QuotaExceeded {
        /// Largest accepted value in bytes.
        limit: usize,
        /// Size of the rejected value in bytes.
        attempted: usize,
    },
}

/// A string-keyed store of serialized values.
pub trait BlobStore: Send + Sync {
    /// Read the value under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

const fn check_quota(limit: Option<usize>, value: &str) -> Result<(), StorageError> {
    match limit {
        Some(limit) if value.len() > limit => Err(StorageError::QuotaExceeded {
            limit,
            attempted: value.len(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// MemoryBlobStore
// =============================================================================

/// In-process blob store.
///
/// Clones share the same map. Used by tests and anywhere a store without a
/// session is needed.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    failing_writes: AtomicUsize,
}

impl MemoryBlobStore {
    /// Create an empty store without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects values over `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                quota: Some(limit),
                ..MemoryInner::default()
            }),
        }
    }

    /// Make the next `count` writes (set or remove) fail as unavailable.
    pub fn fail_next_writes(&self, count: usize) {
        self.inner.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.inner.values.lock().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.inner.values.lock().await.is_empty()
    }

    fn take_write_failure(&self) -> Result<(), StorageError> {
        let failed = self
            .inner
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            Err(StorageError::Unavailable("storage disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.take_write_failure()?;
        check_quota(self.inner.quota, &value)?;
        self.inner
            .values
            .lock()
            .await
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.take_write_failure()?;
        self.inner.values.lock().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// SessionBlobStore
// =============================================================================

/// Blob store backed by the visitor's server-side session.
#[derive(Debug, Clone)]
pub struct SessionBlobStore {
    session: Session,
    quota: usize,
}

impl SessionBlobStore {
    /// Wrap a session, rejecting values over `quota` bytes.
    #[must_use]
    pub const fn new(session: Session, quota: usize) -> Self {
        Self { session, quota }
    }
}

impl BlobStore for SessionBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.session
            .get::<String>(key)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        check_quota(Some(self.quota), &value)?;
        self.session
            .insert(key, value)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.session
            .remove::<String>(key)
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}
