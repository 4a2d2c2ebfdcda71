//! Certificate type (catalog) document schema
//!
//! Catalog of issuable certificate kinds with bilingual labels and fees.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for certificate types
pub const CERTIFICATE_TYPE_COLLECTION: &str = "certificate_types";

/// Certificate type document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CertificateTypeDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Type name (English), unique across the catalog
    pub name: String,

    /// Type name (Bengali)
    #[serde(default)]
    pub name_bn: String,

    /// Certificate body template (English)
    #[serde(default)]
    pub body_text_en: String,

    /// Certificate body template (Bengali)
    #[serde(default)]
    pub body_text_bn: String,

    /// Short description shown on the application form
    #[serde(default)]
    pub description: String,

    /// Application fee in taka
    #[serde(default)]
    pub fee: f64,
}

impl IntoIndexes for CertificateTypeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "name": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for CertificateTypeDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_index_is_unique() {
        let indices = CertificateTypeDoc::into_indices();
        assert_eq!(indices.len(), 1);
        let (keys, opts) = &indices[0];
        assert_eq!(keys.get_i32("name").unwrap(), 1);
        assert_eq!(opts.as_ref().unwrap().unique, Some(true));
    }
}
