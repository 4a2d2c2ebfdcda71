//! Transaction journal document schema
//!
//! Append-only financial log unifying certificate fees and holding tax
//! payments. Entries are never mutated; corrections are compensating
//! negative-amount entries.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for journal entries
pub const TRANSACTION_COLLECTION: &str = "transactions";

/// Source of a journal entry: which collection the entry's id points into.
///
/// Stored flattened as `{ "source": "Certificate" | "HoldingTax",
/// "source_id": ObjectId }`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "source", content = "source_id")]
pub enum TransactionSource {
    /// Certificate fee payment
    Certificate(ObjectId),
    /// Holding tax payment
    HoldingTax(ObjectId),
}

impl TransactionSource {
    /// The referenced document id
    pub fn source_id(&self) -> ObjectId {
        match self {
            TransactionSource::Certificate(id) | TransactionSource::HoldingTax(id) => *id,
        }
    }

    /// Tag string as stored on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            TransactionSource::Certificate(_) => "Certificate",
            TransactionSource::HoldingTax(_) => "HoldingTax",
        }
    }
}

/// Journal entry stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TransactionDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// What this entry records and which document it references
    #[serde(flatten)]
    pub source: TransactionSource,

    /// Amount in taka; negative for compensating corrections
    pub amount: f64,

    /// Human-readable description for reporting
    pub description: String,

    /// Paying citizen, when the payment is linked to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizen_id: Option<ObjectId>,
}

impl Default for TransactionDoc {
    fn default() -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            source: TransactionSource::Certificate(ObjectId::new()),
            amount: 0.0,
            description: String::new(),
            citizen_id: None,
        }
    }
}

impl IntoIndexes for TransactionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Journal completeness lookups by referenced document
            (
                doc! { "source": 1, "source_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("source_ref_index".to_string())
                        .build(),
                ),
            ),
            // Newest-first reporting
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for TransactionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_as_tag_and_id() {
        let id = ObjectId::new();
        let entry = TransactionDoc {
            source: TransactionSource::HoldingTax(id),
            amount: 500.0,
            description: "Holding tax 2024-2025".to_string(),
            ..Default::default()
        };

        let value = bson::to_bson(&entry).unwrap();
        let doc = value.as_document().unwrap();
        assert_eq!(doc.get_str("source").unwrap(), "HoldingTax");
        assert_eq!(doc.get_object_id("source_id").unwrap(), id);
    }

    #[test]
    fn test_source_roundtrip() {
        let id = ObjectId::new();
        let entry = TransactionDoc {
            source: TransactionSource::Certificate(id),
            amount: 100.0,
            description: "Character certificate fee".to_string(),
            ..Default::default()
        };

        let bson_value = bson::to_bson(&entry).unwrap();
        let back: TransactionDoc = bson::from_bson(bson_value).unwrap();
        assert_eq!(back.source, TransactionSource::Certificate(id));
        assert_eq!(back.source.source_id(), id);
        assert_eq!(back.source.tag(), "Certificate");
    }
}
