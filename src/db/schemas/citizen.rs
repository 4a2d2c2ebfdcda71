//! Citizen document schema
//!
//! Resident records owned by the registry; certificates and tax payments
//! reference citizens by id and never embed them.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for citizens
pub const CITIZEN_COLLECTION: &str = "citizens";

/// Citizen document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CitizenDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Full name (English)
    pub name: String,

    /// Full name (Bengali)
    #[serde(default)]
    pub name_bn: String,

    /// Father's name
    #[serde(default)]
    pub father_name: String,

    /// Mother's name
    #[serde(default)]
    pub mother_name: String,

    /// National ID number, if registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    /// Village
    #[serde(default)]
    pub village: String,

    /// Ward number within the union
    #[serde(default)]
    pub ward_no: i32,

    /// Post office
    #[serde(default)]
    pub post_office: String,

    /// Contact phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Date of birth (ISO date string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// Subset of citizen fields safe for unauthenticated disclosure.
///
/// Returned by the public verification endpoint; limited to what a printed
/// certificate already displays.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PublicCitizen {
    pub name: String,
    pub name_bn: String,
    pub village: String,
    pub ward_no: i32,
}

impl From<&CitizenDoc> for PublicCitizen {
    fn from(doc: &CitizenDoc) -> Self {
        Self {
            name: doc.name.clone(),
            name_bn: doc.name_bn.clone(),
            village: doc.village.clone(),
            ward_no: doc.ward_no,
        }
    }
}

impl IntoIndexes for CitizenDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique national ID, sparse since not every resident has one
            (
                doc! { "national_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("national_id_unique".to_string())
                        .build(),
                ),
            ),
            // Name lookups from the staff dashboard
            (
                doc! { "name": 1 },
                Some(IndexOptions::builder().name("name_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for CitizenDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_citizen_excludes_identity_fields() {
        let citizen = CitizenDoc {
            name: "Abdul Karim".to_string(),
            name_bn: "আব্দুল করিম".to_string(),
            national_id: Some("1990123456789".to_string()),
            phone: Some("01700000000".to_string()),
            village: "Charpara".to_string(),
            ward_no: 4,
            ..Default::default()
        };

        let public = PublicCitizen::from(&citizen);
        let json = serde_json::to_value(&public).unwrap();

        assert_eq!(json["name"], "Abdul Karim");
        assert_eq!(json["wardNo"], 4);
        // National ID and phone must never appear in the public projection
        assert!(json.get("nationalId").is_none());
        assert!(json.get("national_id").is_none());
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_national_id_index_is_unique_and_sparse() {
        let indices = CitizenDoc::into_indices();
        let (keys, opts) = &indices[0];
        assert_eq!(keys.get_i32("national_id").unwrap(), 1);
        let opts = opts.as_ref().unwrap();
        assert_eq!(opts.unique, Some(true));
        assert_eq!(opts.sparse, Some(true));
    }
}
