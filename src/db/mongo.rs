//! MongoDB client and collection wrapper
//!
//! Typed collections apply the indexes their schema declares when opened.

use bson::{doc, oid::ObjectId, DateTime, Document};
use futures_util::StreamExt;
use mongodb::{options::IndexOptions, Client, Collection, IndexModel};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info, warn};

use crate::db::schemas::Metadata;
use crate::types::AdminError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// Trait for schemas whose `_id` can be assigned before insert
pub trait AssignId {
    /// Return the document id, assigning a fresh one if unset
    fn ensure_id(&mut self) -> ObjectId;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the server answers a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AdminError> {
        info!("Connecting to MongoDB");

        // Fail fast on unreachable servers instead of the 30s driver default
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| AdminError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let mongo = Self {
            client,
            db_name: db_name.to_string(),
        };
        mongo.ping().await?;

        info!("Connected to MongoDB database '{}'", db_name);
        Ok(mongo)
    }

    pub async fn ping(&self) -> Result<(), AdminError> {
        self.client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AdminError::Database(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, AdminError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    /// Open a collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, AdminError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    async fn apply_indexes(&self) -> Result<(), AdminError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| AdminError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    fn stamp(item: &mut T) {
        let now = DateTime::now();
        let metadata = item.mut_metadata();
        metadata.created_at = Some(now);
        metadata.updated_at = Some(now);
    }

    /// Insert a document, setting metadata timestamps
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, AdminError> {
        Self::stamp(&mut item);

        let result = self
            .inner
            .insert_one(item)
            .await
            .map_err(|e| AdminError::Database(format!("Insert failed: {}", e)))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AdminError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, AdminError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| AdminError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter, skipping any that fail to decode
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>, AdminError> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| AdminError::Database(format!("Find failed: {}", e)))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Delete every document matching the filter
    pub async fn delete_many(&self, filter: Document) -> Result<u64, AdminError> {
        self.inner
            .delete_many(filter)
            .await
            .map(|r| r.deleted_count)
            .map_err(|e| AdminError::Database(format!("Delete failed: {}", e)))
    }

    pub async fn delete_one(&self, filter: Document) -> Result<u64, AdminError> {
        self.inner
            .delete_one(filter)
            .await
            .map(|r| r.deleted_count)
            .map_err(|e| AdminError::Database(format!("Delete failed: {}", e)))
    }

    pub async fn count(&self, filter: Document) -> Result<u64, AdminError> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| AdminError::Database(format!("Count failed: {}", e)))
    }

    /// Run an aggregation pipeline, returning raw documents
    pub async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, AdminError> {
        use futures_util::TryStreamExt;

        let cursor = self
            .inner
            .aggregate(pipeline)
            .await
            .map_err(|e| AdminError::Database(format!("Aggregation failed: {}", e)))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AdminError::Database(format!("Aggregation failed: {}", e)))
    }
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata + AssignId,
{
    /// Insert a batch as a unit.
    ///
    /// Ids are assigned up front so that a failed insert can remove whatever
    /// part of the batch the server accepted before the error.
    pub async fn insert_many(&self, mut items: Vec<T>) -> Result<Vec<ObjectId>, AdminError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ObjectId> = items
            .iter_mut()
            .map(|item| {
                Self::stamp(item);
                item.ensure_id()
            })
            .collect();

        if let Err(e) = self.inner.insert_many(items).await {
            warn!(count = ids.len(), "Batch insert failed, removing partial writes");
            if let Err(cleanup) = self
                .inner
                .delete_many(doc! { "_id": { "$in": ids.clone() } })
                .await
            {
                error!("Failed to remove partial batch: {}", cleanup);
            }
            return Err(AdminError::Database(format!("Insert failed: {}", e)));
        }

        Ok(ids)
    }
}
