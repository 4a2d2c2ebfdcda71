//! Union office administrative service
//!
//! JSON/HTTP service for a local government union office backed by MongoDB:
//!
//! - **Citizen registry**: resident records referenced by everything else
//! - **Certificate catalog and records**: application intake, staff review,
//!   issuance with unique public numbers
//! - **Holding tax ledger**: one payment per citizen per financial year,
//!   unique receipts
//! - **Transaction journal**: append-only log of every fee and tax payment
//! - **Public verification**: certificate lookup by number for anyone
//!   holding one

pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{OfficeError, Result};
