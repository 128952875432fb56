// src/mongo_store.rs

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{options::ClientOptions, Client, Collection, Database};

use crate::error::StoreError;
use crate::store::CollectionStore;

/// MongoDB-backed store. One collection per project inside `db`.
pub struct MongoDB {
    pub db: Database,
}

impl MongoDB {
    /// Parses `uri` and builds a client whose connect and server-selection
    /// waits are bounded by `timeout`. No connection is opened until the
    /// first operation.
    pub async fn init(uri: &str, db_name: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some("issue-tracker".to_string());
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);
        Ok(MongoDB { db })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl CollectionStore for MongoDB {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let mut cursor = self.collection(collection).find(filter).await?;

        let mut docs = vec![];
        while let Some(doc_res) = cursor.next().await {
            docs.push(doc_res?);
        }
        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<ObjectId, StoreError> {
        let res = self.collection(collection).insert_one(doc).await?;
        res.inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingInsertedId)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<u64, StoreError> {
        let update_op = doc! { "$set": changes };
        let res = self.collection(collection).update_one(filter, update_op).await?;
        Ok(res.modified_count)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let res = self.collection(collection).delete_one(filter).await?;
        Ok(res.deleted_count)
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), StoreError> {
        self.collection(collection).drop().await?;
        Ok(())
    }
}
