//! Relocate command implementation.

use faktur_core::Store;
use std::path::Path;
use tracing::info;

/// Runs the relocate command.
pub fn run(path: &Path, to: &Path, remove_old: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!("Relocating storage root {:?} -> {:?}", path, to);
    let mut store = Store::new(path);
    store.initialize()?;
    store.migrate_to_new_path(to, remove_old)?;

    println!("Relocated {} -> {}", path.display(), to.display());
    if !remove_old {
        println!("The old tree was kept; pass --remove-old to delete it.");
    }

    Ok(())
}
