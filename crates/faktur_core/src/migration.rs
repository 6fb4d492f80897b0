//! Schema migration engine.
//!
//! The database record carries a semantic `version` string. On load, a
//! stored record behind the current version is walked through an ordered
//! catalog of transforms, each moving the raw JSON value from one schema
//! version to the next. Transforms only know their immediate predecessor
//! shape; the store deserializes the terminal value into the typed record,
//! so every chain ends in a checked contract.
//!
//! The catalog's single-chain invariant (no duplicate `fromVersion`, each
//! `toVersion` feeding the next definition, terminating at the current
//! version) is validated eagerly via [`MigrationCatalog::validate`] before
//! any data is touched.

use crate::error::{CoreError, CoreResult};
use crate::version::compare_versions;
use serde_json::{json, Value};
use std::cmp::Ordering;

/// The schema version this engine writes.
pub const CURRENT_SCHEMA_VERSION: &str = "1.2.0";

/// Number template introduced with schema 1.1.0 and used as the default.
pub const DEFAULT_NUMBER_FORMAT: &str = "{PREFIX}-{YEAR}-{NUMBER:4}";

/// A transform from one schema shape to the next.
///
/// Receives the entire record at its source shape and returns it reshaped
/// to the target schema, typically carrying all fields forward unchanged.
/// A transform must not fail for any record the engine routes to it; a
/// failure aborts store initialization.
pub type Transform = fn(Value) -> CoreResult<Value>;

/// One step of the migration catalog.
#[derive(Clone)]
pub struct Migration {
    /// Version this migration upgrades from.
    pub from_version: &'static str,
    /// Version this migration produces.
    pub to_version: &'static str,
    /// The transform function.
    pub transform: Transform,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("from_version", &self.from_version)
            .field("to_version", &self.to_version)
            .finish_non_exhaustive()
    }
}

/// Returns true iff `stored` is behind the current schema version.
#[must_use]
pub fn needs_migration(stored: &str) -> bool {
    compare_versions(stored, CURRENT_SCHEMA_VERSION) == Ordering::Less
}

/// An ordered catalog of migrations ending at a current version.
#[derive(Debug, Clone)]
pub struct MigrationCatalog {
    migrations: Vec<Migration>,
    current_version: String,
}

impl MigrationCatalog {
    /// Creates an empty catalog targeting `current_version`.
    #[must_use]
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            migrations: Vec::new(),
            current_version: current_version.into(),
        }
    }

    /// The catalog with all known migrations, targeting
    /// [`CURRENT_SCHEMA_VERSION`].
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new(CURRENT_SCHEMA_VERSION);
        let steps = [
            Migration {
                from_version: "1.0.0",
                to_version: "1.1.0",
                transform: migrate_1_0_to_1_1,
            },
            Migration {
                from_version: "1.1.0",
                to_version: "1.2.0",
                transform: migrate_1_1_to_1_2,
            },
        ];
        for step in steps {
            catalog
                .register(step)
                .unwrap_or_else(|_| unreachable!("builtin catalog registers unique versions"));
        }
        catalog
    }

    /// Appends a migration.
    ///
    /// Returns an error if a migration with the same `from_version` is
    /// already registered.
    pub fn register(&mut self, migration: Migration) -> CoreResult<()> {
        if self
            .migrations
            .iter()
            .any(|m| m.from_version == migration.from_version)
        {
            return Err(CoreError::migration_failed(format!(
                "duplicate migration from version {}",
                migration.from_version
            )));
        }
        self.migrations.push(migration);
        Ok(())
    }

    /// The version this catalog migrates to.
    #[must_use]
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Registered migrations in declaration order.
    #[must_use]
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Checks the single-chain invariant eagerly.
    ///
    /// The catalog, read in declaration order, must form one unbroken
    /// chain whose final `to_version` equals the current version. A
    /// malformed catalog is a configuration error and should fail fast,
    /// before any record is routed through it.
    pub fn validate(&self) -> CoreResult<()> {
        if self.migrations.is_empty() {
            return Ok(());
        }
        for pair in self.migrations.windows(2) {
            if pair[0].to_version != pair[1].from_version {
                return Err(CoreError::migration_failed(format!(
                    "catalog gap: {} -> {} is followed by {} -> {}",
                    pair[0].from_version,
                    pair[0].to_version,
                    pair[1].from_version,
                    pair[1].to_version
                )));
            }
        }
        let last = &self.migrations[self.migrations.len() - 1];
        if compare_versions(last.to_version, &self.current_version) != Ordering::Equal {
            return Err(CoreError::migration_failed(format!(
                "catalog ends at {} but current version is {}",
                last.to_version, self.current_version
            )));
        }
        Ok(())
    }

    /// Brings a raw record up to the current schema version.
    ///
    /// A record already at (or past) the current version is returned
    /// unchanged. Otherwise the catalog is scanned for a definition whose
    /// `from_version` matches the running version; it is applied and the
    /// scan repeats until no applicable definition remains. Fails with
    /// [`CoreError::MigrationIncomplete`] if the walk stalls short of the
    /// current version.
    pub fn run(&self, mut value: Value) -> CoreResult<Value> {
        let mut running = stored_version(&value)?;

        if compare_versions(&running, &self.current_version) != Ordering::Less {
            return Ok(value);
        }

        loop {
            let next = self.migrations.iter().find(|m| {
                m.from_version == running
                    && compare_versions(&running, &self.current_version) == Ordering::Less
            });
            let Some(migration) = next else { break };

            tracing::debug!(
                from = migration.from_version,
                to = migration.to_version,
                "applying schema migration"
            );
            value = (migration.transform)(value)?;
            running = migration.to_version.to_string();
        }

        if compare_versions(&running, &self.current_version) != Ordering::Equal {
            return Err(CoreError::MigrationIncomplete {
                reached: running,
                expected: self.current_version.clone(),
            });
        }
        Ok(value)
    }
}

/// Reads the `version` field of a raw record.
fn stored_version(value: &Value) -> CoreResult<String> {
    value
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CoreError::migration_failed("record has no version field"))
}

/// Returns a mutable handle to the record's settings object, creating it
/// if the stored record never had one.
fn settings_object(value: &mut Value) -> CoreResult<&mut serde_json::Map<String, Value>> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| CoreError::migration_failed("record is not a JSON object"))?;
    let settings = object
        .entry("settings")
        .or_insert_with(|| json!({}));
    settings
        .as_object_mut()
        .ok_or_else(|| CoreError::migration_failed("settings is not a JSON object"))
}

/// 1.0.0 -> 1.1.0: introduce configurable number templates and empty
/// per-year counters on the numbering settings.
fn migrate_1_0_to_1_1(mut value: Value) -> CoreResult<Value> {
    let settings = settings_object(&mut value)?;
    settings
        .entry("invoiceNumberFormat")
        .or_insert_with(|| json!(DEFAULT_NUMBER_FORMAT));
    settings
        .entry("offerNumberFormat")
        .or_insert_with(|| json!(DEFAULT_NUMBER_FORMAT));
    settings.insert("invoiceYearCounters".to_string(), json!({}));
    settings.insert("offerYearCounters".to_string(), json!({}));

    value["version"] = json!("1.1.0");
    Ok(value)
}

/// 1.1.0 -> 1.2.0: add the product catalog as an empty set.
fn migrate_1_1_to_1_2(mut value: Value) -> CoreResult<Value> {
    let settings = settings_object(&mut value)?;
    settings.entry("products").or_insert_with(|| json!([]));

    value["version"] = json!("1.2.0");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DatabaseRecord;

    /// A raw record as a 1.0.0 installation would have written it.
    fn record_v1_0_0() -> Value {
        json!({
            "version": "1.0.0",
            "customers": [],
            "settings": {
                "currency": "EUR",
                "defaultTaxRate": 19,
                "invoicePrefix": "INV",
                "offerPrefix": "OFF",
                "invoiceCounter": 12,
                "offerCounter": 3,
                "labels": {
                    "invoiceTitle": "Invoice",
                    "offerTitle": "Offer",
                    "greeting": "Dear Sir or Madam,",
                    "closing": "Thank you for your business.",
                    "paymentTerms": "Payable within 14 days without deduction."
                },
                "locale": "en",
                "theme": "light"
            }
        })
    }

    #[test]
    fn builtin_catalog_is_valid() {
        MigrationCatalog::builtin().validate().unwrap();
    }

    #[test]
    fn duplicate_from_version_rejected() {
        let mut catalog = MigrationCatalog::new("1.1.0");
        catalog
            .register(Migration {
                from_version: "1.0.0",
                to_version: "1.1.0",
                transform: migrate_1_0_to_1_1,
            })
            .unwrap();
        let result = catalog.register(Migration {
            from_version: "1.0.0",
            to_version: "1.1.0",
            transform: migrate_1_0_to_1_1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn validate_detects_gap() {
        let mut catalog = MigrationCatalog::new("1.2.0");
        catalog
            .register(Migration {
                from_version: "1.0.0",
                to_version: "1.1.0",
                transform: migrate_1_0_to_1_1,
            })
            .unwrap();
        // Ends at 1.1.0, current is 1.2.0.
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn validate_detects_broken_chain() {
        let mut catalog = MigrationCatalog::new("1.3.0");
        catalog
            .register(Migration {
                from_version: "1.0.0",
                to_version: "1.1.0",
                transform: migrate_1_0_to_1_1,
            })
            .unwrap();
        catalog
            .register(Migration {
                from_version: "1.2.0",
                to_version: "1.3.0",
                transform: migrate_1_1_to_1_2,
            })
            .unwrap();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn current_record_passes_through_unchanged() {
        let catalog = MigrationCatalog::builtin();
        let record = serde_json::to_value(DatabaseRecord::new_default()).unwrap();
        let migrated = catalog.run(record.clone()).unwrap();
        assert_eq!(migrated, record);
    }

    #[test]
    fn newer_record_passes_through_unchanged() {
        let catalog = MigrationCatalog::builtin();
        let record = json!({"version": "9.0.0", "future": true});
        assert_eq!(catalog.run(record.clone()).unwrap(), record);
    }

    #[test]
    fn full_chain_from_1_0_0() {
        let catalog = MigrationCatalog::builtin();
        let migrated = catalog.run(record_v1_0_0()).unwrap();

        assert_eq!(migrated["version"], "1.2.0");
        let settings = &migrated["settings"];
        assert_eq!(settings["invoiceNumberFormat"], DEFAULT_NUMBER_FORMAT);
        assert_eq!(settings["offerNumberFormat"], DEFAULT_NUMBER_FORMAT);
        assert_eq!(settings["invoiceYearCounters"], json!({}));
        assert_eq!(settings["offerYearCounters"], json!({}));
        assert_eq!(settings["products"], json!([]));

        // Existing fields carried forward.
        assert_eq!(settings["invoiceCounter"], 12);
        assert_eq!(settings["currency"], "EUR");
    }

    #[test]
    fn migrated_record_deserializes_into_current_schema() {
        let catalog = MigrationCatalog::builtin();
        let migrated = catalog.run(record_v1_0_0()).unwrap();
        let record: DatabaseRecord = serde_json::from_value(migrated).unwrap();
        assert_eq!(record.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(record.settings.invoice_counter, 12);
        assert!(record.settings.products.is_empty());
    }

    #[test]
    fn intermediate_record_runs_remaining_steps_only() {
        let catalog = MigrationCatalog::builtin();
        let v1_1 = catalog
            .migrations()
            .iter()
            .find(|m| m.from_version == "1.0.0")
            .map(|m| (m.transform)(record_v1_0_0()).unwrap())
            .unwrap();
        assert_eq!(v1_1["version"], "1.1.0");

        let migrated = catalog.run(v1_1).unwrap();
        assert_eq!(migrated["version"], "1.2.0");
        assert_eq!(migrated["settings"]["products"], json!([]));
    }

    #[test]
    fn stalled_walk_reports_incomplete() {
        // Record at a version no catalog entry starts from.
        let catalog = MigrationCatalog::builtin();
        let record = json!({"version": "0.9.0", "settings": {}});
        let result = catalog.run(record);
        assert!(matches!(
            result,
            Err(CoreError::MigrationIncomplete { reached, .. }) if reached == "0.9.0"
        ));
    }

    #[test]
    fn missing_version_field_fails() {
        let catalog = MigrationCatalog::builtin();
        let result = catalog.run(json!({"settings": {}}));
        assert!(matches!(result, Err(CoreError::MigrationFailed { .. })));
    }

    #[test]
    fn needs_migration_compares_against_current() {
        assert!(needs_migration("1.0.0"));
        assert!(needs_migration("1.1.0"));
        assert!(!needs_migration(CURRENT_SCHEMA_VERSION));
        assert!(!needs_migration("2.0.0"));
    }
}
