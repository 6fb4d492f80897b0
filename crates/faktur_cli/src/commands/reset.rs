//! Reset command implementation.

use faktur_core::Store;
use std::path::Path;

/// Runs the reset command. The `--yes` gate lives in `main`.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new(path);
    store.initialize()?;
    store.reset_all_data()?;

    println!("Storage root {} reset to defaults", path.display());
    Ok(())
}
