//! Verification token document schema
//!
//! Short-lived tokens for email/OTP verification flows. MongoDB expires the
//! documents ten minutes after insertion via a TTL index anchored on the
//! creation timestamp, which every insert stamps.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for verification tokens
pub const VERIFY_TOKEN_COLLECTION: &str = "verify_tokens";

/// Token lifetime before TTL cleanup
pub const VERIFY_TOKEN_TTL_SECS: u64 = 600;

/// Verification token stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VerifyTokenDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata; `created_at` anchors the TTL index
    #[serde(default)]
    pub metadata: Metadata,

    /// Opaque token value
    pub token: String,

    /// Flow this token belongs to: "email", "otp"
    #[serde(default)]
    pub purpose: String,

    /// Who the token was issued to (email address or phone)
    #[serde(default)]
    pub subject: String,
}

impl IntoIndexes for VerifyTokenDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "metadata.created_at": 1 },
                Some(
                    IndexOptions::builder()
                        .expire_after(Duration::from_secs(VERIFY_TOKEN_TTL_SECS))
                        .name("created_at_ttl".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "token": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("token_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for VerifyTokenDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_anchors_on_creation_timestamp() {
        let indices = VerifyTokenDoc::into_indices();
        let (keys, opts) = &indices[0];
        // created_at is stamped on every insert, so no token can escape expiry
        assert_eq!(keys.get_i32("metadata.created_at").unwrap(), 1);
        assert_eq!(
            opts.as_ref().unwrap().expire_after,
            Some(Duration::from_secs(600))
        );
    }
}
