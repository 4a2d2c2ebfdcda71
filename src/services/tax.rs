//! Holding tax payment recorder
//!
//! One payment per citizen per financial year, enforced by the compound
//! unique index rather than check-then-act. Receipt numbers are generated
//! with a bounded retry on index collision. Every successful payment appends
//! exactly one journal entry; if the append fails the payment document is
//! compensatingly removed so the caller never observes a half-recorded
//! payment.

use bson::{doc, oid::ObjectId, DateTime};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tracing::{error, info};

use crate::db::schemas::{
    CitizenDoc, HoldingTaxDoc, TransactionSource, CITIZEN_COLLECTION, CITIZEN_YEAR_INDEX,
    HOLDING_TAX_COLLECTION, RECEIPT_NUMBER_INDEX,
};
use crate::db::{MongoClient, MongoCollection};
use crate::services::journal::JournalService;
use crate::types::{OfficeError, Result};

/// Attempts at generating a fresh receipt number before giving up
const RECEIPT_RETRY_LIMIT: usize = 5;

/// Payment request from the admin surface
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxPaymentRequest {
    pub citizen_id: String,
    pub financial_year: String,
    pub amount: f64,
    #[serde(default)]
    pub collected_by: Option<String>,
}

/// Recorder for the holding tax ledger
#[derive(Clone)]
pub struct TaxService {
    taxes: MongoCollection<HoldingTaxDoc>,
    citizens: MongoCollection<CitizenDoc>,
    journal: JournalService,
}

impl TaxService {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            taxes: mongo.collection(HOLDING_TAX_COLLECTION).await?,
            citizens: mongo.collection(CITIZEN_COLLECTION).await?,
            journal: JournalService::new(mongo).await?,
        })
    }

    /// Record a holding tax payment and its journal entry.
    ///
    /// Fails with Conflict when a payment already exists for the same
    /// (citizen, financial year) pair; receipt-number collisions are retried
    /// with a fresh number instead of failing the payment.
    pub async fn record_payment(&self, req: TaxPaymentRequest) -> Result<HoldingTaxDoc> {
        validate_financial_year(&req.financial_year)?;
        if req.amount < 0.0 || !req.amount.is_finite() {
            return Err(OfficeError::Validation(
                "amount must be a non-negative number".to_string(),
            ));
        }

        let citizen_id = ObjectId::parse_str(&req.citizen_id)
            .map_err(|_| OfficeError::Validation("citizenId is not a valid id".to_string()))?;

        if self.citizens.count(doc! { "_id": citizen_id }).await? == 0 {
            return Err(OfficeError::NotFound(format!(
                "citizen {citizen_id} does not exist"
            )));
        }

        let mut attempt = 0;
        let (inserted, tax_id) = loop {
            attempt += 1;
            let mut tax = HoldingTaxDoc {
                citizen_id,
                financial_year: req.financial_year.clone(),
                amount: req.amount,
                paid_at: Some(DateTime::now()),
                receipt_number: generate_receipt_number(&req.financial_year),
                collected_by: req.collected_by.clone().unwrap_or_default(),
                ..Default::default()
            };

            match self.taxes.insert_one(tax.clone()).await {
                Ok(id) => {
                    tax._id = Some(id);
                    break (tax, id);
                }
                Err(OfficeError::Conflict(msg)) if msg.contains(RECEIPT_NUMBER_INDEX) => {
                    // Receipt collision: regenerate, never fail the payment
                    if attempt >= RECEIPT_RETRY_LIMIT {
                        error!(
                            "Receipt generation exhausted after {} attempts for citizen {}",
                            attempt, citizen_id
                        );
                        return Err(OfficeError::Internal(
                            "could not allocate a unique receipt number".to_string(),
                        ));
                    }
                    continue;
                }
                Err(OfficeError::Conflict(msg)) if msg.contains(CITIZEN_YEAR_INDEX) => {
                    return Err(OfficeError::Conflict(format!(
                        "holding tax already paid by citizen {} for {}",
                        citizen_id, req.financial_year
                    )));
                }
                Err(e) => return Err(e),
            }
        };

        let description = format!(
            "Holding tax {} receipt {}",
            inserted.financial_year, inserted.receipt_number
        );

        // Journal completeness is part of the payment, not a side note: if the
        // append fails, the payment document is removed again.
        if let Err(e) = self
            .journal
            .append(
                TransactionSource::HoldingTax(tax_id),
                inserted.amount,
                description,
                Some(citizen_id),
            )
            .await
        {
            error!(
                "Journal append failed for tax payment {}, rolling back: {}",
                tax_id, e
            );
            if let Err(del) = self.taxes.delete_one(doc! { "_id": tax_id }).await {
                error!(
                    "Compensating delete failed for tax payment {}: {}",
                    tax_id, del
                );
            }
            return Err(OfficeError::Internal(
                "payment could not be journaled and was not recorded".to_string(),
            ));
        }

        info!(
            "Holding tax payment recorded: citizen {} year {} receipt {}",
            citizen_id, inserted.financial_year, inserted.receipt_number
        );
        Ok(inserted)
    }

    /// Payments for one citizen, or the whole ledger when `citizen_id` is None
    pub async fn list_payments(&self, citizen_id: Option<ObjectId>) -> Result<Vec<HoldingTaxDoc>> {
        let filter = match citizen_id {
            Some(id) => doc! { "citizen_id": id },
            None => doc! {},
        };
        self.taxes.find_many(filter).await
    }

    /// Look up one payment by receipt number
    pub async fn get_by_receipt(&self, receipt_no: &str) -> Result<HoldingTaxDoc> {
        self.taxes
            .find_one(doc! { "receipt_number": receipt_no })
            .await?
            .ok_or_else(|| OfficeError::NotFound(format!("no payment with receipt {receipt_no}")))
    }
}

/// Validate a financial year of the form "2024-2025" (consecutive years)
pub fn validate_financial_year(year: &str) -> Result<()> {
    let parts: Vec<&str> = year.split('-').collect();
    let valid = match parts.as_slice() {
        [start, end] if start.len() == 4 && end.len() == 4 => {
            match (start.parse::<u32>(), end.parse::<u32>()) {
                (Ok(s), Ok(e)) => e == s + 1,
                _ => false,
            }
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(OfficeError::Validation(format!(
            "financialYear must look like \"2024-2025\", got \"{year}\""
        )))
    }
}

/// Generate a receipt number: `HT-<start year>-<8 alphanumerics>`.
///
/// Uniqueness is the receipt index's job; this only needs enough entropy to
/// make collisions rare.
pub fn generate_receipt_number(financial_year: &str) -> String {
    let start_year = financial_year.split('-').next().unwrap_or("0000");
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("HT-{start_year}-{token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_year_accepts_consecutive() {
        assert!(validate_financial_year("2024-2025").is_ok());
        assert!(validate_financial_year("1999-2000").is_ok());
    }

    #[test]
    fn test_financial_year_rejects_malformed() {
        assert!(validate_financial_year("2024-2026").is_err());
        assert!(validate_financial_year("2025-2024").is_err());
        assert!(validate_financial_year("24-25").is_err());
        assert!(validate_financial_year("2024").is_err());
        assert!(validate_financial_year("2024/2025").is_err());
        assert!(validate_financial_year("").is_err());
        assert!(validate_financial_year("abcd-efgh").is_err());
    }

    #[test]
    fn test_receipt_number_format() {
        let receipt = generate_receipt_number("2024-2025");
        assert!(receipt.starts_with("HT-2024-"));
        let token = receipt.strip_prefix("HT-2024-").unwrap();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(token
            .chars()
            .all(|c| !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_receipt_numbers_differ_across_draws() {
        let a = generate_receipt_number("2024-2025");
        let b = generate_receipt_number("2024-2025");
        // 36^8 values; a collision here means the generator is broken
        assert_ne!(a, b);
    }
}
