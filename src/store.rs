// src/store.rs

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::error::StoreError;

/// Single-document operations against a named collection.
///
/// Every project maps to one collection. Implementations give per-document
/// atomicity only; callers add no locking of their own.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// All documents whose fields equal every entry of `filter`.
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Inserts `doc` and returns the identifier the store assigned to it.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<ObjectId, StoreError>;

    /// Sets every field of `changes` on the first match. Returns the modified count.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<u64, StoreError>;

    /// Returns the deleted count.
    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    /// Drops the whole collection. Dropping a missing collection is not an error.
    async fn drop_collection(&self, collection: &str) -> Result<(), StoreError>;
}
