use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{FlowError, Result};

/// Per-session key/value store shared by every task that runs for a user.
///
/// Clones share the same underlying map, so a `Session` loaded from storage
/// and the copy a task receives observe each other's writes.
#[derive(Clone, Debug)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| FlowError::ContextError(format!("cannot serialize {key}: {e}")))?;
        self.data.insert(key, value);
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    /// Removes and returns the value under `key` only when `predicate` accepts it.
    ///
    /// The check and the removal happen under the same shard lock, so when two
    /// callers race for the same entry at most one of them gets it back.
    pub async fn take_if<T, F>(&self, key: &str, predicate: F) -> Option<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> bool,
    {
        let mut decoded = None;
        self.data.remove_if(key, |_, value| {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(v) if predicate(&v) => {
                    decoded = Some(v);
                    true
                }
                _ => false,
            }
        });
        decoded
    }

    pub async fn clear(&self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn take_if_only_removes_matching_value() {
        let context = Context::new();
        context.set("pending", 42u64).await.unwrap();

        let missed: Option<u64> = context.take_if("pending", |v: &u64| *v == 7).await;
        assert!(missed.is_none());
        assert!(context.contains("pending").await);

        let taken: Option<u64> = context.take_if("pending", |v: &u64| *v == 42).await;
        assert_eq!(taken, Some(42));
        assert!(!context.contains("pending").await);

        let again: Option<u64> = context.take_if("pending", |_: &u64| true).await;
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let context = Context::new();
        let other = context.clone();
        other.set("offered", vec![1u64, 2, 3]).await.unwrap();

        let offered: Vec<u64> = context.get("offered").await.unwrap();
        assert_eq!(offered, vec![1, 2, 3]);
    }
}
