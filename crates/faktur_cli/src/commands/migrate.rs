//! Migrate command implementation.

use faktur_core::{Store, CURRENT_SCHEMA_VERSION};
use std::path::Path;
use tracing::info;

/// Runs the migrate command.
///
/// `Store::initialize` performs any pending migration and re-persists the
/// record; this command exists so upgrades can be applied (and verified)
/// without starting the application.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.join("database.json").exists() {
        return Err(format!("No storage root found at {}", path.display()).into());
    }

    info!("Checking schema version for {:?}", path);
    let store = Store::new(path);
    store.initialize()?;

    let record = store.record()?;
    println!(
        "Storage root {} is at schema version {} (current: {})",
        path.display(),
        record.version,
        CURRENT_SCHEMA_VERSION
    );

    Ok(())
}
