//! Certificate catalog manager
//!
//! CRUD over certificate types. Name uniqueness rides on the unique index;
//! deletion is blocked while certificate records still reference the type.

use bson::{doc, oid::ObjectId};
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::{
    CertificateDoc, CertificateTypeDoc, CERTIFICATE_COLLECTION, CERTIFICATE_TYPE_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{OfficeError, Result};

/// Partial update for a certificate type
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypePatch {
    pub name: Option<String>,
    pub name_bn: Option<String>,
    pub body_text_en: Option<String>,
    pub body_text_bn: Option<String>,
    pub description: Option<String>,
    pub fee: Option<f64>,
}

impl TypePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.name_bn.is_none()
            && self.body_text_en.is_none()
            && self.body_text_bn.is_none()
            && self.description.is_none()
            && self.fee.is_none()
    }
}

/// Manager for the certificate type catalog
#[derive(Clone)]
pub struct CatalogService {
    types: MongoCollection<CertificateTypeDoc>,
    certificates: MongoCollection<CertificateDoc>,
}

impl CatalogService {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            types: mongo.collection(CERTIFICATE_TYPE_COLLECTION).await?,
            certificates: mongo.collection(CERTIFICATE_COLLECTION).await?,
        })
    }

    /// Create a catalog entry; duplicate names are rejected with Conflict
    pub async fn create_type(&self, mut doc: CertificateTypeDoc) -> Result<CertificateTypeDoc> {
        let name = doc.name.trim().to_string();
        if name.is_empty() {
            return Err(OfficeError::Validation("name is required".to_string()));
        }
        if doc.fee < 0.0 || !doc.fee.is_finite() {
            return Err(OfficeError::Validation(
                "fee must be a non-negative number".to_string(),
            ));
        }
        doc.name = name;

        let id = match self.types.insert_one(doc.clone()).await {
            Ok(id) => id,
            Err(OfficeError::Conflict(_)) => {
                return Err(OfficeError::Conflict(format!(
                    "certificate type \"{}\" already exists",
                    doc.name
                )))
            }
            Err(e) => return Err(e),
        };

        doc._id = Some(id);
        info!("Certificate type created: {} ({})", doc.name, id);
        Ok(doc)
    }

    pub async fn list_types(&self) -> Result<Vec<CertificateTypeDoc>> {
        self.types.find_many(doc! {}).await
    }

    pub async fn get_type(&self, id: ObjectId) -> Result<CertificateTypeDoc> {
        self.types
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| OfficeError::NotFound(format!("certificate type {id} not found")))
    }

    /// Apply a partial update; a rename re-checks the unique index
    pub async fn update_type(&self, id: ObjectId, patch: TypePatch) -> Result<CertificateTypeDoc> {
        if patch.is_empty() {
            return Err(OfficeError::Validation("empty update".to_string()));
        }
        if let Some(fee) = patch.fee {
            if fee < 0.0 || !fee.is_finite() {
                return Err(OfficeError::Validation(
                    "fee must be a non-negative number".to_string(),
                ));
            }
        }

        let mut set = doc! { "metadata.updated_at": bson::DateTime::now() };
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(OfficeError::Validation("name cannot be blank".to_string()));
            }
            set.insert("name", name.trim());
        }
        if let Some(v) = &patch.name_bn {
            set.insert("name_bn", v);
        }
        if let Some(v) = &patch.body_text_en {
            set.insert("body_text_en", v);
        }
        if let Some(v) = &patch.body_text_bn {
            set.insert("body_text_bn", v);
        }
        if let Some(v) = &patch.description {
            set.insert("description", v);
        }
        if let Some(v) = patch.fee {
            set.insert("fee", v);
        }

        let result = self
            .types
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await
            .map_err(|e| match e {
                OfficeError::Conflict(_) => {
                    OfficeError::Conflict("another certificate type already has that name".into())
                }
                other => other,
            })?;

        if result.matched_count == 0 {
            return Err(OfficeError::NotFound(format!(
                "certificate type {id} not found"
            )));
        }

        self.get_type(id).await
    }

    /// Remove a catalog entry.
    ///
    /// Fails with NotFound when no type matches, and with Conflict when any
    /// certificate record still references the type; issued records must not
    /// be orphaned.
    pub async fn delete_type(&self, id: ObjectId) -> Result<()> {
        let existing = self.get_type(id).await?;

        let referencing = self
            .certificates
            .count(doc! { "certificate_type": &existing.name })
            .await?;
        if referencing > 0 {
            return Err(OfficeError::Conflict(format!(
                "certificate type \"{}\" is referenced by {} certificate record(s)",
                existing.name, referencing
            )));
        }

        let deleted = self.types.delete_one(doc! { "_id": id }).await?;
        if deleted == 0 {
            return Err(OfficeError::NotFound(format!(
                "certificate type {id} not found"
            )));
        }

        info!("Certificate type deleted: {} ({})", existing.name, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_emptiness() {
        assert!(TypePatch::default().is_empty());
        let patch = TypePatch {
            fee: Some(120.0),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_deserializes_camel_case() {
        let patch: TypePatch =
            serde_json::from_str(r#"{"nameBn":"চারিত্রিক সনদ","fee":50}"#).unwrap();
        assert_eq!(patch.name_bn.as_deref(), Some("চারিত্রিক সনদ"));
        assert_eq!(patch.fee, Some(50.0));
        assert!(patch.name.is_none());
    }
}
