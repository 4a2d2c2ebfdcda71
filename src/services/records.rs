//! Staff certificate record administration
//!
//! Status transitions, issuance numbering and fee payment. Issuance assigns
//! the unique public certificate number; fee payment appends the journal
//! entry that makes the fee visible to reporting.

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::FindOptions;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{error, info};

use crate::db::schemas::{
    CertificateDoc, CertificateStatus, CertificateTypeDoc, TransactionSource,
    CERTIFICATE_COLLECTION, CERTIFICATE_TYPE_COLLECTION,
};
use crate::db::mongo::with_deadline;
use crate::db::{MongoClient, MongoCollection};
use crate::services::journal::JournalService;
use crate::types::{OfficeError, Result};

/// Attempts at generating a fresh certificate number before giving up
const NUMBER_RETRY_LIMIT: usize = 5;

/// Staff-side manager for certificate records
#[derive(Clone)]
pub struct RecordsService {
    certificates: MongoCollection<CertificateDoc>,
    types: MongoCollection<CertificateTypeDoc>,
    journal: JournalService,
}

impl RecordsService {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            certificates: mongo.collection(CERTIFICATE_COLLECTION).await?,
            types: mongo.collection(CERTIFICATE_TYPE_COLLECTION).await?,
            journal: JournalService::new(mongo).await?,
        })
    }

    /// Paginated listing for the dashboard, newest first
    pub async fn list_certificates(
        &self,
        status: Option<CertificateStatus>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<CertificateDoc>> {
        use futures_util::TryStreamExt;

        let mut filter = doc! { "metadata.is_deleted": { "$ne": true } };
        if let Some(status) = status {
            filter.insert("status", status.to_string());
        }

        let (skip, limit) = page_window(page, limit);
        let options = FindOptions::builder()
            .sort(doc! { "metadata.created_at": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let records: Vec<CertificateDoc> = with_deadline(
            self.certificates.op_timeout(),
            "certificates find",
            async {
                self.certificates
                    .inner()
                    .find(filter)
                    .with_options(options)
                    .await
                    .map_err(|e| OfficeError::Database(format!("Find failed: {}", e)))?
                    .try_collect()
                    .await
                    .map_err(|e| OfficeError::Database(format!("Cursor failed: {}", e)))
            },
        )
        .await?;

        Ok(records)
    }

    pub async fn get_certificate(&self, id: ObjectId) -> Result<CertificateDoc> {
        self.certificates
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| OfficeError::NotFound(format!("certificate {id} not found")))
    }

    /// Transition a record's lifecycle status.
    ///
    /// Illegal transitions fail with Conflict. Moving to Issued assigns the
    /// unique certificate number and re-stamps the issue date; number
    /// collisions against the unique index are retried.
    pub async fn transition_status(
        &self,
        id: ObjectId,
        next: CertificateStatus,
    ) -> Result<CertificateDoc> {
        let current = self.get_certificate(id).await?;

        if !current.status.can_transition_to(next) {
            return Err(OfficeError::Conflict(format!(
                "cannot transition certificate {} from {} to {}",
                id, current.status, next
            )));
        }

        if next != CertificateStatus::Issued {
            self.certificates
                .update_one(
                    doc! { "_id": id },
                    doc! { "$set": {
                        "status": next.to_string(),
                        "metadata.updated_at": DateTime::now(),
                    }},
                )
                .await?;
            info!("Certificate {} -> {}", id, next);
            return self.get_certificate(id).await;
        }

        // Issuance: allocate a public number under the unique index
        let mut attempt = 0;
        loop {
            attempt += 1;
            let number = generate_certificate_number(&current.certificate_type);
            let result = self
                .certificates
                .update_one(
                    doc! { "_id": id },
                    doc! { "$set": {
                        "status": CertificateStatus::Issued.to_string(),
                        "certificate_number": &number,
                        "issue_date": DateTime::now(),
                        "metadata.updated_at": DateTime::now(),
                    }},
                )
                .await;

            match result {
                Ok(_) => {
                    info!("Certificate {} issued as {}", id, number);
                    return self.get_certificate(id).await;
                }
                Err(OfficeError::Conflict(_)) if attempt < NUMBER_RETRY_LIMIT => continue,
                Err(OfficeError::Conflict(_)) => {
                    error!(
                        "Certificate number allocation exhausted after {} attempts for {}",
                        attempt, id
                    );
                    return Err(OfficeError::Internal(
                        "could not allocate a unique certificate number".to_string(),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Record the application fee as paid and journal it.
    ///
    /// The fee amount comes from the catalog, not the caller. Conflict if the
    /// record is already paid or was rejected.
    pub async fn record_fee_payment(&self, id: ObjectId) -> Result<CertificateDoc> {
        let current = self.get_certificate(id).await?;

        if current.is_paid {
            return Err(OfficeError::Conflict(format!(
                "fee already collected for certificate {id}"
            )));
        }
        if current.status == CertificateStatus::Rejected {
            return Err(OfficeError::Conflict(format!(
                "certificate {id} was rejected, no fee to collect"
            )));
        }

        let fee = self
            .types
            .find_one(doc! { "name": &current.certificate_type })
            .await?
            .map(|t| t.fee)
            .ok_or_else(|| {
                OfficeError::Internal(format!(
                    "certificate type \"{}\" missing from catalog",
                    current.certificate_type
                ))
            })?;

        self.certificates
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "is_paid": true,
                    "fee_paid": fee,
                    "metadata.updated_at": DateTime::now(),
                }},
            )
            .await?;

        let description = format!("{} fee", current.certificate_type);
        if let Err(e) = self
            .journal
            .append(
                TransactionSource::Certificate(id),
                fee,
                description,
                Some(current.citizen_id),
            )
            .await
        {
            // Roll the payment flag back so the books stay consistent
            error!(
                "Journal append failed for certificate fee {}, rolling back: {}",
                id, e
            );
            if let Err(undo) = self
                .certificates
                .update_one(
                    doc! { "_id": id },
                    doc! { "$set": { "is_paid": false, "fee_paid": 0.0 } },
                )
                .await
            {
                error!("Fee payment rollback failed for {}: {}", id, undo);
            }
            return Err(OfficeError::Internal(
                "fee could not be journaled and was not recorded".to_string(),
            ));
        }

        info!("Certificate {} fee {} collected", id, fee);
        self.get_certificate(id).await
    }
}

/// Clamp caller-supplied pagination to a skip/limit window.
///
/// Limit is capped at 100; the skip is computed in u64 so a hostile page
/// number cannot overflow.
fn page_window(page: u32, limit: u32) -> (u64, i64) {
    let limit = limit.clamp(1, 100);
    let skip = u64::from(page.max(1) - 1) * u64::from(limit);
    (skip, i64::from(limit))
}

/// Generate a certificate number: `CRT-<type prefix>-<8 alphanumerics>`
pub fn generate_certificate_number(type_name: &str) -> String {
    let prefix: String = type_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    let prefix = if prefix.is_empty() {
        "GEN".to_string()
    } else {
        prefix
    };

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("CRT-{prefix}-{token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_survives_hostile_values() {
        let (skip, limit) = page_window(u32::MAX, 1_000_000);
        assert_eq!(limit, 100);
        assert_eq!(skip, (u64::from(u32::MAX) - 1) * 100);

        let (skip, limit) = page_window(0, 0);
        assert_eq!((skip, limit), (0, 1));
    }

    #[test]
    fn test_page_window_defaults() {
        assert_eq!(page_window(1, 20), (0, 20));
        assert_eq!(page_window(3, 20), (40, 20));
    }

    #[test]
    fn test_certificate_number_format() {
        let number = generate_certificate_number("Character Certificate");
        assert!(number.starts_with("CRT-CHA-"));
        let token = number.strip_prefix("CRT-CHA-").unwrap();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_certificate_number_fallback_prefix() {
        let number = generate_certificate_number("১২৩");
        assert!(number.starts_with("CRT-GEN-"));
    }

    #[test]
    fn test_certificate_numbers_differ_across_draws() {
        let a = generate_certificate_number("Residency");
        let b = generate_certificate_number("Residency");
        assert_ne!(a, b);
    }
}
