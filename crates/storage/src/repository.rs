use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showcase_core::model::{AccessToken, RefreshToken, Session, SessionDataError, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the current session is persisted.
pub const SESSION_STORAGE_KEY: &str = "showcase.session";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("malformed stored record: {0}")]
    MalformedRecord(String),
}

/// Durable key-value storage scoped to one browser context (or one local profile).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Persistence contract for the single current session.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MalformedRecord` if a value is stored but cannot be
    /// decoded, or other storage errors.
    async fn load_session(&self) -> Result<Option<Session>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn save_session(&self, session: &Session) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the stored session cannot be erased.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

/// Persisted shape of a session.
///
/// Kept separate from the domain `Session` so the storage format can evolve
/// without leaking serde concerns into the core crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: u64,
    pub display_name: String,
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub access_expiry_hint: Option<DateTime<Utc>>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.user_id().value(),
            display_name: session.display_name().to_owned(),
            access: session.access_token().as_str().to_owned(),
            refresh: session.refresh_token().as_str().to_owned(),
            access_expiry_hint: session.access_expiry_hint(),
        }
    }

    /// Convert the record back into a domain `Session`.
    ///
    /// # Errors
    ///
    /// Returns `SessionDataError` if either token is blank.
    pub fn into_session(self) -> Result<Session, SessionDataError> {
        let access = AccessToken::new(self.access)?;
        let refresh = RefreshToken::new(self.refresh)?;
        Ok(
            Session::new(UserId::new(self.user_id), self.display_name, access, refresh)
                .with_expiry_hint(self.access_expiry_hint),
        )
    }
}

/// Stores the session as JSON under a single key of a `KeyValueStore`.
#[derive(Clone)]
pub struct KeyValueSessionRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KeyValueSessionRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, SESSION_STORAGE_KEY)
    }

    #[must_use]
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SessionRepository for KeyValueSessionRepository {
    async fn load_session(&self) -> Result<Option<Session>, StorageError> {
        let Some(raw) = self.store.get_item(&self.key).await? else {
            return Ok(None);
        };
        let record: SessionRecord = serde_json::from_str(&raw)
            .map_err(|err| StorageError::MalformedRecord(err.to_string()))?;
        record
            .into_session()
            .map(Some)
            .map_err(|err| StorageError::MalformedRecord(err.to_string()))
    }

    async fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&SessionRecord::from_session(session))
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.set_item(&self.key, &raw).await
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        self.store.remove_item(&self.key).await
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates the raw store and the session repository behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub items: Arc<dyn KeyValueStore>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_store(items: Arc<dyn KeyValueStore>) -> Self {
        let sessions: Arc<dyn SessionRepository> =
            Arc::new(KeyValueSessionRepository::new(Arc::clone(&items)));
        Self { items, sessions }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}
