//! Per-user key/value storage used to remember thread ids.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::AssistantError;

/// Namespaced string storage owned by the surrounding chat framework.
pub trait UserStorage: Send + Sync {
    fn get(&self, user: &str, namespace: &str, key: &str) -> Result<Option<String>, AssistantError>;

    fn put(&self, user: &str, namespace: &str, key: &str, value: String) -> Result<(), AssistantError>;
}

/// Process-local [`UserStorage`].
#[derive(Debug, Default)]
pub struct InMemoryUserStorage {
    entries: RwLock<HashMap<(String, String, String), String>>,
}

impl InMemoryUserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> AssistantError {
    AssistantError::Storage("user storage lock poisoned".into())
}

impl UserStorage for InMemoryUserStorage {
    fn get(&self, user: &str, namespace: &str, key: &str) -> Result<Option<String>, AssistantError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(&(user.to_string(), namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn put(&self, user: &str, namespace: &str, key: &str, value: String) -> Result<(), AssistantError> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert((user.to_string(), namespace.to_string(), key.to_string()), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_scoped_by_user_and_namespace() {
        let storage = InMemoryUserStorage::new();
        storage.put("alice", "openapi", "thread-id", "t1".into()).unwrap();
        storage.put("bob", "openapi", "thread-id", "t2".into()).unwrap();

        assert_eq!(storage.get("alice", "openapi", "thread-id").unwrap().as_deref(), Some("t1"));
        assert_eq!(storage.get("bob", "openapi", "thread-id").unwrap().as_deref(), Some("t2"));
        assert_eq!(storage.get("alice", "other", "thread-id").unwrap(), None);
        assert_eq!(storage.len(), 2);
    }
}
