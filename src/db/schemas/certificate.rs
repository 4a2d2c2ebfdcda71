//! Certificate record document schema
//!
//! A citizen's application for (and eventual issuance of) a certificate.
//! References the citizen and a catalog type by name; carries lifecycle
//! status and payment state.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for certificate records
pub const CERTIFICATE_COLLECTION: &str = "certificates";

/// Lifecycle status of a certificate record
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CertificateStatus {
    /// Submitted, awaiting staff review
    #[default]
    Pending,
    /// Approved by staff, fee may still be outstanding
    Approved,
    /// Rejected by staff
    Rejected,
    /// Issued with an assigned certificate number
    Issued,
}

impl CertificateStatus {
    /// Whether a staff transition from `self` to `next` is allowed.
    ///
    /// Pending -> Approved | Rejected, Approved -> Issued | Rejected.
    /// Issued and Rejected records are terminal.
    pub fn can_transition_to(self, next: CertificateStatus) -> bool {
        use CertificateStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Issued) | (Approved, Rejected)
        )
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CertificateStatus::Pending => "Pending",
            CertificateStatus::Approved => "Approved",
            CertificateStatus::Rejected => "Rejected",
            CertificateStatus::Issued => "Issued",
        };
        write!(f, "{s}")
    }
}

/// Certificate record stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CertificateDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning citizen
    pub citizen_id: ObjectId,

    /// Catalog type name this record was applied under
    pub certificate_type: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: CertificateStatus,

    /// Public lookup number, assigned at issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,

    /// Application date, re-stamped at issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<DateTime>,

    /// Whether the application fee has been collected
    #[serde(default)]
    pub is_paid: bool,

    /// Fee amount collected in taka
    #[serde(default)]
    pub fee_paid: f64,

    /// Free-form note supplied by the applicant
    #[serde(default)]
    pub applicant_note: String,
}

impl IntoIndexes for CertificateDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Public lookup key; sparse since numbers are assigned at issuance
            (
                doc! { "certificate_number": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("certificate_number_unique".to_string())
                        .build(),
                ),
            ),
            // Per-citizen listing
            (
                doc! { "citizen_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("citizen_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for CertificateDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use CertificateStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Issued));
        assert!(Approved.can_transition_to(Rejected));

        // Terminal states
        assert!(!Issued.can_transition_to(Pending));
        assert!(!Issued.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Issued));
        assert!(!Rejected.can_transition_to(Approved));

        // No skipping review
        assert!(!Pending.can_transition_to(Issued));
        // No self-loops
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(CertificateStatus::default(), CertificateStatus::Pending);
        let doc = CertificateDoc::default();
        assert_eq!(doc.status, CertificateStatus::Pending);
        assert!(!doc.is_paid);
        assert_eq!(doc.fee_paid, 0.0);
    }

    #[test]
    fn test_certificate_number_index_unique_sparse() {
        let indices = CertificateDoc::into_indices();
        let (keys, opts) = &indices[0];
        assert_eq!(keys.get_i32("certificate_number").unwrap(), 1);
        let opts = opts.as_ref().unwrap();
        assert_eq!(opts.unique, Some(true));
        assert_eq!(opts.sparse, Some(true));
    }
}
