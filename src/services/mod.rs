//! Domain services for the union office
//!
//! Route handlers stay thin; the lifecycle and ledger rules live here.

pub mod analytics;
pub mod catalog;
pub mod intake;
pub mod journal;
pub mod records;
pub mod settings;
pub mod tax;
pub mod verification;

pub use analytics::{AnalyticsService, AnalyticsSnapshot};
pub use catalog::{CatalogService, TypePatch};
pub use intake::{ApplicationPayload, IntakeService};
pub use journal::JournalService;
pub use records::RecordsService;
pub use settings::{SettingsPatch, SettingsService};
pub use tax::{TaxPaymentRequest, TaxService};
pub use verification::{VerificationService, VerifiedCertificate};
