//! Daily analytics snapshot document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for analytics snapshots
pub const ANALYTICS_COLLECTION: &str = "analytics";

/// One day of dashboard analytics
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AnalyticsDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Snapshot day, "YYYY-MM-DD"
    pub date: String,

    /// Page visits recorded that day
    #[serde(default)]
    pub visits: i64,

    /// Certificate applications submitted that day
    #[serde(default)]
    pub applications: i64,

    /// Total payments taken that day in taka
    #[serde(default)]
    pub payments_amount: f64,
}

impl IntoIndexes for AnalyticsDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "date": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("date_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for AnalyticsDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
