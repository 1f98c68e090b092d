use std::collections::HashMap;
use std::sync::Arc;

use coursegate_common::DocumentKey;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::store::{DocumentStore, Modification, StoreError};

/// Process-local document store, one learner per process.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    documents: Arc<Mutex<HashMap<DocumentKey, Value>>>,
}

impl DocumentStore for InMemoryStore {
    async fn get(&self, key: DocumentKey) -> Result<Option<Value>, StoreError> {
        Ok(self.documents.lock().await.get(&key).cloned())
    }

    async fn put(&self, key: DocumentKey, value: Value) -> Result<(), StoreError> {
        self.documents.lock().await.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: DocumentKey) -> Result<(), StoreError> {
        self.documents.lock().await.remove(&key);
        Ok(())
    }

    async fn modify<T, E, F>(&self, key: DocumentKey, f: F) -> Result<T, E>
    where
        T: Send,
        E: From<StoreError> + Send,
        F: FnOnce(Option<Value>) -> Result<Modification<T>, E> + Send,
    {
        let mut documents = self.documents.lock().await;
        match f(documents.get(&key).cloned())? {
            Modification::Keep(result) => Ok(result),
            Modification::Write(value, result) => {
                documents.insert(key, value);
                Ok(result)
            }
        }
    }
}
