//! Notification document schema
//!
//! Announcements shown on the public site and staff dashboard.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for notifications
pub const NOTIFICATION_COLLECTION: &str = "notifications";

/// Notification stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NotificationDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Headline
    pub title: String,

    /// Body text
    #[serde(default)]
    pub body: String,

    /// Audience: "public" or "staff"
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_audience() -> String {
    "public".to_string()
}

impl IntoIndexes for NotificationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "metadata.created_at": -1 },
            Some(
                IndexOptions::builder()
                    .name("created_at_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for NotificationDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
