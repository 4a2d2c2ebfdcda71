//! Public certificate verification
//!
//! Read-only lookup by public certificate number, joined with the public
//! subset of the owning citizen. Anyone holding a number may call this;
//! internal status is returned so a holder can see a revoked or pending
//! record for what it is.

use bson::doc;
use serde::Serialize;
use tracing::error;

use crate::db::schemas::{
    CertificateDoc, CitizenDoc, PublicCitizen, CERTIFICATE_COLLECTION, CITIZEN_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{OfficeError, Result};

/// Verification result returned to the public caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCertificate {
    pub certificate_number: String,
    pub certificate_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    pub is_paid: bool,
    pub citizen: PublicCitizen,
}

/// Read-only verification service
#[derive(Clone)]
pub struct VerificationService {
    certificates: MongoCollection<CertificateDoc>,
    citizens: MongoCollection<CitizenDoc>,
}

impl VerificationService {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            certificates: mongo.collection(CERTIFICATE_COLLECTION).await?,
            citizens: mongo.collection(CITIZEN_COLLECTION).await?,
        })
    }

    /// Look up a certificate by its public number
    pub async fn verify_by_certificate_number(&self, cert_no: &str) -> Result<VerifiedCertificate> {
        let cert_no = cert_no.trim();
        if cert_no.is_empty() {
            return Err(OfficeError::Validation("certNo is required".to_string()));
        }

        let certificate = self
            .certificates
            .find_one(doc! { "certificate_number": cert_no })
            .await?
            .ok_or_else(|| {
                OfficeError::NotFound(format!("no certificate with number {cert_no}"))
            })?;

        let citizen = self
            .citizens
            .find_one(doc! { "_id": certificate.citizen_id })
            .await?
            .ok_or_else(|| {
                // A certificate without its citizen is a data integrity
                // failure, not a bad request
                error!(
                    "Certificate {} references missing citizen {}",
                    cert_no, certificate.citizen_id
                );
                OfficeError::Internal(format!(
                    "citizen record missing for certificate {cert_no}"
                ))
            })?;

        Ok(VerifiedCertificate {
            certificate_number: cert_no.to_string(),
            certificate_type: certificate.certificate_type.clone(),
            status: certificate.status.to_string(),
            issue_date: certificate
                .issue_date
                .map(|d| d.try_to_rfc3339_string().unwrap_or_default()),
            is_paid: certificate.is_paid,
            citizen: PublicCitizen::from(&citizen),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_certificate_wire_shape() {
        let verified = VerifiedCertificate {
            certificate_number: "CRT-CHA-AB12CD34".to_string(),
            certificate_type: "Character Certificate".to_string(),
            status: "Issued".to_string(),
            issue_date: Some("2025-01-15T10:00:00Z".to_string()),
            is_paid: true,
            citizen: PublicCitizen {
                name: "Abdul Karim".to_string(),
                name_bn: "আব্দুল করিম".to_string(),
                village: "Charpara".to_string(),
                ward_no: 4,
            },
        };

        let json = serde_json::to_value(&verified).unwrap();
        assert_eq!(json["certificateNumber"], "CRT-CHA-AB12CD34");
        assert_eq!(json["status"], "Issued");
        assert_eq!(json["citizen"]["wardNo"], 4);
        // The joined citizen stays limited to the public subset
        assert!(json["citizen"].get("nationalId").is_none());
    }
}
