//! MongoDB client and collection wrapper

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{
    options::{IndexOptions, UpdateModifications},
    results::UpdateResult,
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::OfficeError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// Run a storage operation under a deadline.
///
/// The driver's socket timeout bounds the wire, but a degraded server can
/// still stall an in-flight operation; this converts the elapsed deadline
/// into `Timeout` so callers get a 504 instead of a hang.
pub async fn with_deadline<T, F>(limit: Duration, op: &str, fut: F) -> Result<T, OfficeError>
where
    F: Future<Output = Result<T, OfficeError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(OfficeError::Timeout(format!(
            "{} exceeded {}ms",
            op,
            limit.as_millis()
        ))),
    }
}

/// Append the driver timeouts to a connection URI.
///
/// Server selection and connect establishment stay short; the socket timeout
/// carries the configured per-operation budget so slow queries are bounded
/// even on paths that talk to the raw collection.
fn timeout_uri(uri: &str, request_timeout_ms: u64) -> String {
    let params = format!(
        "serverSelectionTimeoutMS=3000&connectTimeoutMS=3000&socketTimeoutMS={}",
        request_timeout_ms
    );
    if uri.contains('?') {
        format!("{}&{}", uri, params)
    } else {
        format!("{}?{}", uri, params)
    }
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
    op_timeout: Duration,
}

impl MongoClient {
    /// Create a new MongoDB client.
    ///
    /// `request_timeout_ms` bounds every storage operation issued through
    /// this client, both at the socket and as an outer deadline.
    pub async fn new(
        uri: &str,
        db_name: &str,
        request_timeout_ms: u64,
    ) -> Result<Self, OfficeError> {
        info!("Connecting to MongoDB at {}", uri);

        let op_timeout = Duration::from_millis(request_timeout_ms);
        let client = Client::with_uri_str(&timeout_uri(uri, request_timeout_ms))
            .await
            .map_err(|e| {
                OfficeError::Unavailable(format!("Failed to connect to MongoDB: {}", e))
            })?;

        // Verify connection with timeout
        with_deadline(op_timeout, "ping", async {
            client
                .database(db_name)
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(|e| OfficeError::Unavailable(format!("MongoDB ping failed: {}", e)))
        })
        .await?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
            op_timeout,
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, OfficeError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name, self.op_timeout).await
    }

    /// Check connectivity (readiness probe)
    pub async fn ping(&self) -> Result<(), OfficeError> {
        with_deadline(self.op_timeout, "ping", async {
            self.client
                .database(&self.db_name)
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(|e| OfficeError::Unavailable(format!("MongoDB ping failed: {}", e)))?;
            Ok(())
        })
        .await
    }

    /// Get the raw MongoDB client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the database name
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
    op_timeout: Duration,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
        op_timeout: Duration,
    ) -> Result<Self, OfficeError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection {
            inner: collection,
            op_timeout,
        };

        // Apply indexes
        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), OfficeError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        with_deadline(self.op_timeout, "create indexes", async {
            self.inner
                .create_indexes(indices)
                .await
                .map_err(|e| OfficeError::Database(format!("Failed to create indexes: {}", e)))?;
            Ok(())
        })
        .await
    }

    /// Insert a document, setting metadata timestamps.
    ///
    /// Duplicate-key violations surface as `Conflict` via the error
    /// conversion; everything else as `Database`.
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, OfficeError> {
        let metadata = item.mut_metadata();
        metadata.is_deleted = false;
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        let result = with_deadline(self.op_timeout, "insert", async {
            self.inner.insert_one(item).await.map_err(OfficeError::from)
        })
        .await?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| OfficeError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, OfficeError> {
        // Add is_deleted check
        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        with_deadline(self.op_timeout, "find", async {
            self.inner
                .find_one(full_filter)
                .await
                .map_err(|e| OfficeError::Database(format!("Find failed: {}", e)))
        })
        .await
    }

    /// Find many documents by filter
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>, OfficeError> {
        use futures_util::StreamExt;

        // Add is_deleted check
        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        with_deadline(self.op_timeout, "find", async {
            let cursor = self
                .inner
                .find(full_filter)
                .await
                .map_err(|e| OfficeError::Database(format!("Find failed: {}", e)))?;

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
        })
        .await
    }

    /// Count documents matching a filter
    pub async fn count(&self, filter: Document) -> Result<u64, OfficeError> {
        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        with_deadline(self.op_timeout, "count", async {
            self.inner
                .count_documents(full_filter)
                .await
                .map_err(|e| OfficeError::Database(format!("Count failed: {}", e)))
        })
        .await
    }

    /// Update one document
    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> Result<UpdateResult, OfficeError> {
        let modifications = update.into();

        with_deadline(self.op_timeout, "update", async {
            self.inner
                .update_one(filter, modifications)
                .await
                .map_err(OfficeError::from)
        })
        .await
    }

    /// Soft delete a document
    pub async fn soft_delete(&self, filter: Document) -> Result<UpdateResult, OfficeError> {
        let update = doc! {
            "$set": {
                "metadata.is_deleted": true,
                "metadata.deleted_at": DateTime::now(),
                "metadata.updated_at": DateTime::now(),
            }
        };

        self.update_one(filter, update).await
    }

    /// Hard delete a document.
    ///
    /// Used for catalog removal and for the compensating delete in the tax
    /// recorder; soft deletion would keep the unique index entries alive.
    pub async fn delete_one(&self, filter: Document) -> Result<u64, OfficeError> {
        with_deadline(self.op_timeout, "delete", async {
            let result = self
                .inner
                .delete_one(filter)
                .await
                .map_err(|e| OfficeError::Database(format!("Delete failed: {}", e)))?;
            Ok(result.deleted_count)
        })
        .await
    }

    /// The per-operation deadline for this collection
    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_elapses_as_timeout() {
        let result: Result<(), OfficeError> = tokio_test::block_on(with_deadline(
            Duration::from_millis(10),
            "stalled find",
            std::future::pending(),
        ));
        match result {
            Err(OfficeError::Timeout(msg)) => assert!(msg.contains("stalled find")),
            other => panic!("expected Timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_deadline_passes_result_through() {
        let result = tokio_test::block_on(with_deadline(
            Duration::from_millis(50),
            "find",
            async { Ok::<_, OfficeError>(7) },
        ));
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_deadline_preserves_inner_errors() {
        let result: Result<(), OfficeError> = tokio_test::block_on(with_deadline(
            Duration::from_millis(50),
            "find",
            async { Err(OfficeError::NotFound("no such receipt".into())) },
        ));
        match result {
            Err(OfficeError::NotFound(msg)) => assert!(msg.contains("receipt")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_uri_carries_operation_timeout() {
        let uri = timeout_uri("mongodb://localhost:27017", 30_000);
        assert!(uri.contains("socketTimeoutMS=30000"));
        assert!(uri.contains("serverSelectionTimeoutMS=3000"));

        let uri = timeout_uri("mongodb://host:27017/?replicaSet=rs0", 5_000);
        assert!(uri.contains("?replicaSet=rs0&"));
        assert!(uri.contains("socketTimeoutMS=5000"));
    }
}
