//! Ledger behavior against a running MongoDB instance.
//!
//! These cover what the in-process tests cannot: the unique indexes doing
//! their job under real writes, journal completeness, and the compensating
//! rollback when the journal refuses an entry. Run them with a disposable
//! server:
//!
//! ```text
//! MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored
//! ```
//!
//! Each test works in its own database and drops it at the end.

use bson::doc;
use bson::oid::ObjectId;

use union_office::db::schemas::{
    CertificateTypeDoc, CitizenDoc, TransactionSource, CITIZEN_COLLECTION, TRANSACTION_COLLECTION,
};
use union_office::db::{init_collections, MongoClient};
use union_office::services::{CatalogService, JournalService, TaxPaymentRequest, TaxService};
use union_office::types::OfficeError;

fn mongo_uri() -> String {
    std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

async fn test_client() -> MongoClient {
    let db_name = format!("union_office_test_{}", ObjectId::new().to_hex());
    MongoClient::new(&mongo_uri(), &db_name, 5_000)
        .await
        .expect("test MongoDB must be reachable")
}

async fn drop_test_db(client: &MongoClient) {
    client
        .inner()
        .database(client.db_name())
        .drop()
        .await
        .unwrap();
}

async fn seed_citizen(client: &MongoClient, name: &str) -> ObjectId {
    let citizens = client
        .collection::<CitizenDoc>(CITIZEN_COLLECTION)
        .await
        .unwrap();
    citizens
        .insert_one(CitizenDoc {
            name: name.to_string(),
            village: "Charpara".to_string(),
            ward_no: 4,
            ..Default::default()
        })
        .await
        .unwrap()
}

fn payment(citizen_id: ObjectId, year: &str, amount: f64) -> TaxPaymentRequest {
    TaxPaymentRequest {
        citizen_id: citizen_id.to_hex(),
        financial_year: year.to_string(),
        amount,
        collected_by: Some("Rahima Khatun".to_string()),
    }
}

#[test]
#[ignore = "requires a running MongoDB instance"]
fn test_second_payment_for_same_year_conflicts() {
    tokio_test::block_on(async {
        let client = test_client().await;
        init_collections(&client).await.unwrap();
        let citizen = seed_citizen(&client, "Abdul Karim").await;
        let tax = TaxService::new(&client).await.unwrap();

        let first = tax
            .record_payment(payment(citizen, "2024-2025", 500.0))
            .await
            .unwrap();
        assert!(first.receipt_number.starts_with("HT-2024-"));

        // Paying twice for the same year must be refused, whatever the amount
        let second = tax.record_payment(payment(citizen, "2024-2025", 750.0)).await;
        match second {
            Err(OfficeError::Conflict(msg)) => assert!(msg.contains("2024-2025")),
            other => panic!("expected Conflict, got {:?}", other),
        }

        // A different year is a fresh obligation
        tax.record_payment(payment(citizen, "2025-2026", 500.0))
            .await
            .unwrap();

        let payments = tax.list_payments(Some(citizen)).await.unwrap();
        assert_eq!(payments.len(), 2);

        drop_test_db(&client).await;
    });
}

#[test]
#[ignore = "requires a running MongoDB instance"]
fn test_payment_appends_exactly_one_journal_entry() {
    tokio_test::block_on(async {
        let client = test_client().await;
        init_collections(&client).await.unwrap();
        let citizen = seed_citizen(&client, "Mosammat Begum").await;
        let tax = TaxService::new(&client).await.unwrap();
        let journal = JournalService::new(&client).await.unwrap();

        let paid = tax
            .record_payment(payment(citizen, "2024-2025", 500.0))
            .await
            .unwrap();
        let tax_id = paid._id.unwrap();

        let entries = journal
            .entries_for(&TransactionSource::HoldingTax(tax_id))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 500.0);
        assert_eq!(entries[0].citizen_id, Some(citizen));
        assert!(entries[0].description.contains(&paid.receipt_number));

        // And nothing else landed in the journal
        assert_eq!(journal.list_recent(10).await.unwrap().len(), 1);

        drop_test_db(&client).await;
    });
}

#[test]
#[ignore = "requires a running MongoDB instance"]
fn test_journal_failure_rolls_back_payment() {
    tokio_test::block_on(async {
        let client = test_client().await;

        // A validator that rejects every insert makes the journal refuse the
        // entry, forcing the payment's compensating delete
        client
            .inner()
            .database(client.db_name())
            .create_collection(TRANSACTION_COLLECTION)
            .validator(doc! { "$expr": false })
            .await
            .unwrap();

        init_collections(&client).await.unwrap();
        let citizen = seed_citizen(&client, "Abdul Karim").await;
        let tax = TaxService::new(&client).await.unwrap();
        let journal = JournalService::new(&client).await.unwrap();

        let result = tax.record_payment(payment(citizen, "2024-2025", 500.0)).await;
        match result {
            Err(OfficeError::Internal(msg)) => assert!(msg.contains("not recorded")),
            other => panic!("expected Internal, got {:?}", other),
        }

        // The half-recorded payment must not be observable anywhere
        assert!(tax.list_payments(Some(citizen)).await.unwrap().is_empty());
        assert!(journal.list_recent(10).await.unwrap().is_empty());

        // Once the journal accepts writes again the same year goes through,
        // proving the rollback released the (citizen, year) slot
        client
            .inner()
            .database(client.db_name())
            .run_command(doc! { "collMod": TRANSACTION_COLLECTION, "validator": {} })
            .await
            .unwrap();

        let paid = tax
            .record_payment(payment(citizen, "2024-2025", 500.0))
            .await
            .unwrap();
        let entries = journal
            .entries_for(&TransactionSource::HoldingTax(paid._id.unwrap()))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);

        drop_test_db(&client).await;
    });
}

#[test]
#[ignore = "requires a running MongoDB instance"]
fn test_deleted_type_lookup_is_not_found() {
    tokio_test::block_on(async {
        let client = test_client().await;
        init_collections(&client).await.unwrap();
        let catalog = CatalogService::new(&client).await.unwrap();

        let created = catalog
            .create_type(CertificateTypeDoc {
                name: "Character Certificate".to_string(),
                fee: 50.0,
                ..Default::default()
            })
            .await
            .unwrap();
        let id = created._id.unwrap();

        // The unique name index refuses a second entry
        let duplicate = catalog
            .create_type(CertificateTypeDoc {
                name: "Character Certificate".to_string(),
                fee: 80.0,
                ..Default::default()
            })
            .await;
        assert!(matches!(duplicate, Err(OfficeError::Conflict(_))));

        catalog.delete_type(id).await.unwrap();

        assert!(matches!(
            catalog.get_type(id).await,
            Err(OfficeError::NotFound(_))
        ));
        assert!(matches!(
            catalog.delete_type(id).await,
            Err(OfficeError::NotFound(_))
        ));

        drop_test_db(&client).await;
    });
}
