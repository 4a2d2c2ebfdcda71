//! Site settings singleton
//!
//! Lazily created with defaults on first read. Two requests racing to create
//! the default document is harmless; the content is idempotent and
//! last-writer-wins.

use bson::doc;
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::{SettingsDoc, SETTINGS_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{OfficeError, Result};

/// Partial update for settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub union_name: Option<String>,
    pub union_name_bn: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub holding_tax_amount: Option<f64>,
    pub holding_tax_mandatory: Option<bool>,
    pub financial_year: Option<String>,
}

/// Reader/writer for the settings singleton
#[derive(Clone)]
pub struct SettingsService {
    collection: MongoCollection<SettingsDoc>,
}

impl SettingsService {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            collection: mongo.collection(SETTINGS_COLLECTION).await?,
        })
    }

    /// Fetch settings, creating the default document when absent
    pub async fn get(&self) -> Result<SettingsDoc> {
        if let Some(existing) = self.collection.find_one(doc! {}).await? {
            return Ok(existing);
        }

        let mut defaults = SettingsDoc::default();
        match self.collection.insert_one(defaults.clone()).await {
            Ok(id) => {
                defaults._id = Some(id);
                info!("Settings initialized with defaults");
                Ok(defaults)
            }
            // Lost the creation race; the other writer's defaults are ours too
            Err(OfficeError::Conflict(_)) => self
                .collection
                .find_one(doc! {})
                .await?
                .ok_or_else(|| OfficeError::Internal("settings vanished after race".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Apply a partial update to the singleton
    pub async fn update(&self, patch: SettingsPatch) -> Result<SettingsDoc> {
        // Make sure the singleton exists first
        let current = self.get().await?;
        let id = current
            ._id
            .ok_or_else(|| OfficeError::Internal("settings document has no id".to_string()))?;

        let mut set = doc! { "metadata.updated_at": bson::DateTime::now() };
        if let Some(v) = &patch.union_name {
            set.insert("union_name", v);
        }
        if let Some(v) = &patch.union_name_bn {
            set.insert("union_name_bn", v);
        }
        if let Some(v) = &patch.address {
            set.insert("address", v);
        }
        if let Some(v) = &patch.email {
            set.insert("email", v);
        }
        if let Some(v) = &patch.phone {
            set.insert("phone", v);
        }
        if let Some(v) = patch.holding_tax_amount {
            if v < 0.0 || !v.is_finite() {
                return Err(OfficeError::Validation(
                    "holdingTaxAmount must be a non-negative number".to_string(),
                ));
            }
            set.insert("holding_tax_amount", v);
        }
        if let Some(v) = patch.holding_tax_mandatory {
            set.insert("holding_tax_mandatory", v);
        }
        if let Some(v) = &patch.financial_year {
            crate::services::tax::validate_financial_year(v)?;
            set.insert("financial_year", v);
        }

        self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;

        self.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_shape() {
        let defaults = SettingsDoc::default();
        assert!(!defaults.union_name.is_empty());
        assert!(defaults.holding_tax_amount > 0.0);
        assert!(crate::services::tax::validate_financial_year(&defaults.financial_year).is_ok());
    }

    #[test]
    fn test_patch_deserializes_camel_case() {
        let patch: SettingsPatch = serde_json::from_str(
            r#"{"unionName": "Demo Union", "holdingTaxAmount": 750, "holdingTaxMandatory": true}"#,
        )
        .unwrap();
        assert_eq!(patch.union_name.as_deref(), Some("Demo Union"));
        assert_eq!(patch.holding_tax_amount, Some(750.0));
        assert_eq!(patch.holding_tax_mandatory, Some(true));
        assert!(patch.financial_year.is_none());
    }
}
