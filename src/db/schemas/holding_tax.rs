//! Holding tax ledger document schema
//!
//! One payment record per citizen per financial year, enforced by a compound
//! unique index. Receipt numbers are globally unique. Records are created at
//! payment time and never updated.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for holding tax payments
pub const HOLDING_TAX_COLLECTION: &str = "holding_taxes";

/// Name of the compound (citizen, year) unique index
pub const CITIZEN_YEAR_INDEX: &str = "citizen_year_unique";

/// Name of the receipt number unique index
pub const RECEIPT_NUMBER_INDEX: &str = "receipt_number_unique";

/// Holding tax payment stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct HoldingTaxDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Paying citizen
    pub citizen_id: ObjectId,

    /// Financial year, e.g. "2024-2025"
    pub financial_year: String,

    /// Amount paid in taka
    pub amount: f64,

    /// When the payment was taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime>,

    /// Receipt number issued for reconciliation
    pub receipt_number: String,

    /// Staff member who collected the payment
    #[serde(default)]
    pub collected_by: String,
}

impl IntoIndexes for HoldingTaxDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // One payment per citizen per financial year
            (
                doc! { "citizen_id": 1, "financial_year": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name(CITIZEN_YEAR_INDEX.to_string())
                        .build(),
                ),
            ),
            // Globally unique receipts
            (
                doc! { "receipt_number": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name(RECEIPT_NUMBER_INDEX.to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for HoldingTaxDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_index_covers_citizen_and_year() {
        let indices = HoldingTaxDoc::into_indices();
        assert_eq!(indices.len(), 2);

        let (keys, opts) = &indices[0];
        assert_eq!(keys.get_i32("citizen_id").unwrap(), 1);
        assert_eq!(keys.get_i32("financial_year").unwrap(), 1);
        let opts = opts.as_ref().unwrap();
        assert_eq!(opts.unique, Some(true));
        assert_eq!(opts.name.as_deref(), Some(CITIZEN_YEAR_INDEX));
    }

    #[test]
    fn test_receipt_index_unique() {
        let indices = HoldingTaxDoc::into_indices();
        let (keys, opts) = &indices[1];
        assert_eq!(keys.get_i32("receipt_number").unwrap(), 1);
        let opts = opts.as_ref().unwrap();
        assert_eq!(opts.unique, Some(true));
        assert_eq!(opts.name.as_deref(), Some(RECEIPT_NUMBER_INDEX));
    }
}
