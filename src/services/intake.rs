//! Public certificate application intake
//!
//! The security boundary of the application path: whatever the caller sends,
//! the persisted record starts life Pending and unpaid. Status, payment
//! state and certificate number are server-owned fields.

use bson::{doc, oid::ObjectId, DateTime};
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::{
    CertificateDoc, CertificateStatus, CertificateTypeDoc, CitizenDoc, CERTIFICATE_COLLECTION,
    CERTIFICATE_TYPE_COLLECTION, CITIZEN_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{OfficeError, Result};

/// Citizen-supplied application payload.
///
/// `status`, `is_paid`, `fee_paid` and `certificate_number` are accepted so
/// that forged payloads parse instead of erroring, then discarded by
/// [`sanitize`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    pub citizen_id: String,
    pub certificate_type: String,
    #[serde(default)]
    pub applicant_note: String,

    // Caller-supplied values for server-owned fields, ignored
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub fee_paid: Option<f64>,
    #[serde(default)]
    pub certificate_number: Option<String>,
}

/// Build the record that is actually persisted for a public application.
///
/// Forces status=Pending, is_paid=false, fee_paid=0, issue_date=now and a
/// cleared certificate number, regardless of the payload.
pub fn sanitize(citizen_id: ObjectId, payload: &ApplicationPayload) -> CertificateDoc {
    CertificateDoc {
        _id: None,
        citizen_id,
        certificate_type: payload.certificate_type.trim().to_string(),
        status: CertificateStatus::Pending,
        certificate_number: None,
        issue_date: Some(DateTime::now()),
        is_paid: false,
        fee_paid: 0.0,
        applicant_note: payload.applicant_note.clone(),
        ..Default::default()
    }
}

/// Intake service for the public application endpoint
#[derive(Clone)]
pub struct IntakeService {
    certificates: MongoCollection<CertificateDoc>,
    citizens: MongoCollection<CitizenDoc>,
    types: MongoCollection<CertificateTypeDoc>,
}

impl IntakeService {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            certificates: mongo.collection(CERTIFICATE_COLLECTION).await?,
            citizens: mongo.collection(CITIZEN_COLLECTION).await?,
            types: mongo.collection(CERTIFICATE_TYPE_COLLECTION).await?,
        })
    }

    /// Accept a citizen application and persist the sanitized record
    pub async fn submit_application(&self, payload: ApplicationPayload) -> Result<CertificateDoc> {
        let citizen_id = ObjectId::parse_str(&payload.citizen_id)
            .map_err(|_| OfficeError::Validation("citizenId is not a valid id".to_string()))?;

        if payload.certificate_type.trim().is_empty() {
            return Err(OfficeError::Validation(
                "certificateType is required".to_string(),
            ));
        }

        if self.citizens.count(doc! { "_id": citizen_id }).await? == 0 {
            return Err(OfficeError::Validation(format!(
                "citizen {citizen_id} is not registered"
            )));
        }

        let type_name = payload.certificate_type.trim();
        if self
            .types
            .find_one(doc! { "name": type_name })
            .await?
            .is_none()
        {
            return Err(OfficeError::Validation(format!(
                "unknown certificate type \"{type_name}\""
            )));
        }

        let mut record = sanitize(citizen_id, &payload);
        let id = self.certificates.insert_one(record.clone()).await?;
        record._id = Some(id);

        info!(
            "Application submitted: citizen {} type \"{}\" record {}",
            citizen_id, record.certificate_type, id
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forged_payload() -> ApplicationPayload {
        serde_json::from_str(
            r#"{
                "citizenId": "65f0123456789abcdef01234",
                "certificateType": "Character Certificate",
                "status": "Issued",
                "isPaid": true,
                "feePaid": 500,
                "certificateNumber": "CRT-2024-FORGED01"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_sanitize_overrides_forged_fields() {
        let payload = forged_payload();
        let citizen_id = ObjectId::parse_str("65f0123456789abcdef01234").unwrap();
        let record = sanitize(citizen_id, &payload);

        assert_eq!(record.status, CertificateStatus::Pending);
        assert!(!record.is_paid);
        assert_eq!(record.fee_paid, 0.0);
        assert!(record.certificate_number.is_none());
        assert!(record.issue_date.is_some());
        assert_eq!(record.citizen_id, citizen_id);
    }

    #[test]
    fn test_sanitize_keeps_caller_content_fields() {
        let mut payload = forged_payload();
        payload.applicant_note = "need it for passport office".to_string();
        let citizen_id = ObjectId::new();
        let record = sanitize(citizen_id, &payload);

        assert_eq!(record.certificate_type, "Character Certificate");
        assert_eq!(record.applicant_note, "need it for passport office");
    }

    #[test]
    fn test_payload_parses_without_forged_fields() {
        let payload: ApplicationPayload = serde_json::from_str(
            r#"{"citizenId": "65f0123456789abcdef01234", "certificateType": "Residency"}"#,
        )
        .unwrap();
        assert!(payload.status.is_none());
        assert!(payload.is_paid.is_none());
    }
}
