use std::future::Future;

use coursegate_common::DocumentKey;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Single-actor key-value store of whole JSON documents.
///
/// Every write replaces the document under its key. A missing key and a JSON
/// `null` body both read as `None`.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    fn get(
        &self,
        key: DocumentKey,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    fn put(
        &self,
        key: DocumentKey,
        value: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the document. No-op when absent.
    fn remove(&self, key: DocumentKey) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Atomic read-modify-write of one document: no other `modify` or `put`
    /// on the same key interleaves between the read and the write.
    fn modify<T, E, F>(
        &self,
        key: DocumentKey,
        f: F,
    ) -> impl Future<Output = Result<T, E>> + Send
    where
        T: Send,
        E: From<StoreError> + Send,
        F: FnOnce(Option<Value>) -> Result<Modification<T>, E> + Send;
}

/// Outcome of a [`DocumentStore::modify`] closure.
#[derive(Debug)]
pub enum Modification<T> {
    /// Leave the stored document as it is.
    Keep(T),
    /// Replace the stored document.
    Write(Value, T),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document '{key}' is malformed: {source}")]
    Malformed {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Deserialize a stored document.
pub fn decode<T: DeserializeOwned>(
    key: DocumentKey,
    value: Option<Value>,
) -> Result<Option<T>, StoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Malformed { key, source }),
    }
}

pub fn encode<T: Serialize>(key: DocumentKey, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|source| StoreError::Malformed { key, source })
}

pub async fn load<S: DocumentStore, T: DeserializeOwned>(
    store: &S,
    key: DocumentKey,
) -> Result<Option<T>, StoreError> {
    decode(key, store.get(key).await?)
}

pub async fn save<S: DocumentStore, T: Serialize>(
    store: &S,
    key: DocumentKey,
    value: &T,
) -> Result<(), StoreError> {
    store.put(key, encode(key, value)?).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_reads_as_absent() {
        let value: Option<Vec<u32>> = decode(DocumentKey::CompletedChapters, Some(Value::Null)).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn malformed_document_names_its_key() {
        let err = decode::<Vec<u32>>(DocumentKey::CompletedChapters, Some(json!({"oops": true})))
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { key: DocumentKey::CompletedChapters, .. }));
        assert!(err.to_string().starts_with("document 'completedChapters' is malformed"));
    }
}
