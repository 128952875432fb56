// src/memory_store.rs

//! In-process store with the same matching rules as the Mongo backend:
//! filters are an exact-equality conjunction and `update_one` only counts a
//! document as modified when at least one value actually changed.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::CollectionStore;

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)).cloned()))
    }

    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<ObjectId, StoreError> {
        let id = match doc.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        };

        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.lock().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| matches(doc, &filter)))
        else {
            return Ok(0);
        };

        let mut modified = false;
        for (key, value) in changes {
            if doc.get(&key) != Some(&value) {
                doc.insert(key, value);
                modified = true;
            }
        }
        Ok(u64::from(modified))
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let mut collections = self.collections.lock().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| matches(doc, &filter)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), StoreError> {
        self.collections.lock().await.remove(collection);
        Ok(())
    }
}
