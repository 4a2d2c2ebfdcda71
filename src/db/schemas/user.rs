//! Staff user document schema
//!
//! Dashboard accounts for union office staff. Login flows are handled by the
//! admin front end; this service only persists the records and enforces
//! username uniqueness.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for staff users
pub const USER_COLLECTION: &str = "users";

/// Staff user stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Login name, unique
    pub username: String,

    /// Password hash (hashing performed by the admin front end)
    pub password_hash: String,

    /// Display name
    #[serde(default)]
    pub full_name: String,

    /// Role label: "admin", "clerk"
    #[serde(default = "default_role")]
    pub role: String,

    /// Whether the account is active
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_role() -> String {
    "clerk".to_string()
}

fn default_true() -> bool {
    true
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "username": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
