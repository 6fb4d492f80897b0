//! Inspect command implementation.

use faktur_core::{DocumentKind, Store};
use std::path::Path;

/// Runs the inspect command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.join("database.json").exists() {
        return Err(format!("No storage root found at {}", path.display()).into());
    }

    let store = Store::new(path);
    store.initialize()?;

    let record = store.record()?;
    let offers = store.list(DocumentKind::Offer)?;
    let invoices = store.list(DocumentKind::Invoice)?;

    println!("Storage root:    {}", path.display());
    println!("Schema version:  {}", record.version);
    println!("Customers:       {}", record.customers.len());
    println!("Offers:          {}", offers.len());
    println!("Invoices:        {}", invoices.len());
    println!("Currency:        {}", record.settings.currency);
    println!("Invoice format:  {}", record.settings.invoice_number_format);
    println!("Offer format:    {}", record.settings.offer_number_format);

    Ok(())
}
