//! Database schemas for the union office
//!
//! Defines MongoDB document structures for citizens, certificates, the
//! holding tax ledger, the transaction journal and supporting collections.

mod analytics;
mod certificate;
mod certificate_type;
mod citizen;
mod holding_tax;
mod metadata;
mod notification;
mod settings;
mod transaction;
mod user;
mod verify_token;

pub use analytics::{AnalyticsDoc, ANALYTICS_COLLECTION};
pub use certificate::{CertificateDoc, CertificateStatus, CERTIFICATE_COLLECTION};
pub use certificate_type::{CertificateTypeDoc, CERTIFICATE_TYPE_COLLECTION};
pub use citizen::{CitizenDoc, PublicCitizen, CITIZEN_COLLECTION};
pub use holding_tax::{
    HoldingTaxDoc, CITIZEN_YEAR_INDEX, HOLDING_TAX_COLLECTION, RECEIPT_NUMBER_INDEX,
};
pub use metadata::Metadata;
pub use notification::{NotificationDoc, NOTIFICATION_COLLECTION};
pub use settings::{SettingsDoc, SETTINGS_COLLECTION};
pub use transaction::{TransactionDoc, TransactionSource, TRANSACTION_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
pub use verify_token::{VerifyTokenDoc, VERIFY_TOKEN_COLLECTION, VERIFY_TOKEN_TTL_SECS};
