//! Site settings document schema
//!
//! Process-wide singleton configuration document, lazily created with
//! defaults on first read. Races on creation are harmless since the default
//! content is idempotent.

use bson::{oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for settings
pub const SETTINGS_COLLECTION: &str = "settings";

/// Settings singleton stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SettingsDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Union name (English)
    pub union_name: String,

    /// Union name (Bengali)
    #[serde(default)]
    pub union_name_bn: String,

    /// Office address
    #[serde(default)]
    pub address: String,

    /// Contact email
    #[serde(default)]
    pub email: String,

    /// Contact phone
    #[serde(default)]
    pub phone: String,

    /// Default holding tax amount in taka
    #[serde(default)]
    pub holding_tax_amount: f64,

    /// Whether holding tax payment is mandatory before certificate issuance
    #[serde(default)]
    pub holding_tax_mandatory: bool,

    /// Current financial year, e.g. "2024-2025"
    #[serde(default)]
    pub financial_year: String,
}

impl Default for SettingsDoc {
    fn default() -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            union_name: "Union Parishad Office".to_string(),
            union_name_bn: String::new(),
            address: String::new(),
            email: String::new(),
            phone: String::new(),
            holding_tax_amount: 500.0,
            holding_tax_mandatory: false,
            financial_year: "2024-2025".to_string(),
        }
    }
}

impl IntoIndexes for SettingsDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![]
    }
}

impl MutMetadata for SettingsDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
