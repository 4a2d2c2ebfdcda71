//! Transaction journal
//!
//! Append-only writer for the financial log. Every certificate fee and
//! holding tax payment produces exactly one entry here; corrections are
//! compensating negative-amount entries, never mutations.

use bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use tracing::info;

use crate::db::schemas::{
    CertificateDoc, HoldingTaxDoc, TransactionDoc, TransactionSource, CERTIFICATE_COLLECTION,
    HOLDING_TAX_COLLECTION, TRANSACTION_COLLECTION,
};
use crate::db::mongo::with_deadline;
use crate::db::{MongoClient, MongoCollection};
use crate::types::{OfficeError, Result};

/// Append-only journal over the `transactions` collection
#[derive(Clone)]
pub struct JournalService {
    transactions: MongoCollection<TransactionDoc>,
    certificates: MongoCollection<CertificateDoc>,
    holding_taxes: MongoCollection<HoldingTaxDoc>,
}

impl JournalService {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            transactions: mongo.collection(TRANSACTION_COLLECTION).await?,
            certificates: mongo.collection(CERTIFICATE_COLLECTION).await?,
            holding_taxes: mongo.collection(HOLDING_TAX_COLLECTION).await?,
        })
    }

    /// Append one journal entry.
    ///
    /// The referenced document must exist in the collection named by the
    /// source tag; a dangling reference is rejected before anything is
    /// written.
    pub async fn append(
        &self,
        source: TransactionSource,
        amount: f64,
        description: String,
        citizen_id: Option<ObjectId>,
    ) -> Result<ObjectId> {
        let source_id = source.source_id();
        let exists = match source {
            TransactionSource::Certificate(id) => {
                self.certificates.count(doc! { "_id": id }).await? > 0
            }
            TransactionSource::HoldingTax(id) => {
                self.holding_taxes.count(doc! { "_id": id }).await? > 0
            }
        };
        if !exists {
            return Err(OfficeError::NotFound(format!(
                "{} {} does not exist, journal entry refused",
                source.tag(),
                source_id
            )));
        }

        let entry = TransactionDoc {
            source,
            amount,
            description,
            citizen_id,
            ..Default::default()
        };

        let id = self.transactions.insert_one(entry).await?;
        info!(
            "Journal entry {} recorded: {} {} amount {}",
            id,
            source.tag(),
            source_id,
            amount
        );
        Ok(id)
    }

    /// Most recent entries, newest first, for reporting
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<TransactionDoc>> {
        use futures_util::TryStreamExt;

        let options = FindOptions::builder()
            .sort(doc! { "metadata.created_at": -1 })
            .limit(limit)
            .build();

        let entries: Vec<TransactionDoc> = with_deadline(
            self.transactions.op_timeout(),
            "transactions find",
            async {
                self.transactions
                    .inner()
                    .find(doc! { "metadata.is_deleted": { "$ne": true } })
                    .with_options(options)
                    .await
                    .map_err(|e| OfficeError::Database(format!("Find failed: {}", e)))?
                    .try_collect()
                    .await
                    .map_err(|e| OfficeError::Database(format!("Cursor failed: {}", e)))
            },
        )
        .await?;

        Ok(entries)
    }

    /// Entries referencing one source document
    pub async fn entries_for(&self, source: &TransactionSource) -> Result<Vec<TransactionDoc>> {
        self.transactions
            .find_many(doc! { "source": source.tag(), "source_id": source.source_id() })
            .await
    }
}
