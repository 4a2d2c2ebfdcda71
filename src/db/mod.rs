//! MongoDB storage layer

pub mod mongo;
pub mod schemas;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};

use crate::types::Result;
use schemas::{
    AnalyticsDoc, CertificateDoc, CertificateTypeDoc, CitizenDoc, HoldingTaxDoc, NotificationDoc,
    SettingsDoc, TransactionDoc, UserDoc, VerifyTokenDoc, ANALYTICS_COLLECTION,
    CERTIFICATE_COLLECTION, CERTIFICATE_TYPE_COLLECTION, CITIZEN_COLLECTION,
    HOLDING_TAX_COLLECTION, NOTIFICATION_COLLECTION, SETTINGS_COLLECTION, TRANSACTION_COLLECTION,
    USER_COLLECTION, VERIFY_TOKEN_COLLECTION,
};

/// Open every collection once at startup so all indexes exist before the
/// first request: the uniqueness invariants (tax citizen/year, receipt and
/// certificate numbers, type names, usernames) and the verify-token TTL all
/// live in these index definitions. Safe to run repeatedly; index creation
/// is idempotent.
pub async fn init_collections(mongo: &MongoClient) -> Result<()> {
    mongo.collection::<CitizenDoc>(CITIZEN_COLLECTION).await?;
    mongo
        .collection::<CertificateTypeDoc>(CERTIFICATE_TYPE_COLLECTION)
        .await?;
    mongo
        .collection::<CertificateDoc>(CERTIFICATE_COLLECTION)
        .await?;
    mongo
        .collection::<HoldingTaxDoc>(HOLDING_TAX_COLLECTION)
        .await?;
    mongo
        .collection::<TransactionDoc>(TRANSACTION_COLLECTION)
        .await?;
    mongo.collection::<SettingsDoc>(SETTINGS_COLLECTION).await?;
    mongo
        .collection::<AnalyticsDoc>(ANALYTICS_COLLECTION)
        .await?;
    mongo.collection::<UserDoc>(USER_COLLECTION).await?;
    mongo
        .collection::<NotificationDoc>(NOTIFICATION_COLLECTION)
        .await?;
    mongo
        .collection::<VerifyTokenDoc>(VERIFY_TOKEN_COLLECTION)
        .await?;
    Ok(())
}
