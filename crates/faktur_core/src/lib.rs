//! # Faktur Core
//!
//! Persistent data layer for the Faktur invoicing tool.
//!
//! This crate provides:
//! - The schema-versioned database record (customers, business profile,
//!   settings) kept in one pretty-printed JSON file
//! - A migration engine that upgrades stored records across schema
//!   versions via an ordered catalog of transforms
//! - A file-per-entity archive for offers and invoices, partitioned by
//!   creation year
//! - Document number assignment backed by per-year counters and the
//!   `faktur_numbering` template engine

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod migration;
mod model;
mod paths;
mod store;
mod version;

pub use error::{CoreError, CoreResult};
pub use migration::{
    needs_migration, Migration, MigrationCatalog, Transform, CURRENT_SCHEMA_VERSION,
    DEFAULT_NUMBER_FORMAT,
};
pub use model::{
    BusinessProfile, Customer, DatabaseRecord, Document, DocumentFile, DocumentKind,
    DocumentStatus, Labels, LineItem, Product, Settings, StatusChange,
};
pub use paths::StoreLayout;
pub use store::Store;
pub use version::compare_versions;
