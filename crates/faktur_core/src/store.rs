//! Persistent store facade.
//!
//! A [`Store`] owns one storage root: the singleton database record plus
//! the offers/invoices archives. It assumes a single process owns the
//! root; the resident record lives behind an `RwLock` so one handle can be
//! shared, and [`Store::record`] hands out clones only.

use crate::error::{CoreError, CoreResult};
use crate::migration::{needs_migration, MigrationCatalog, CURRENT_SCHEMA_VERSION};
use crate::model::{DatabaseRecord, Document, DocumentFile, DocumentKind};
use crate::paths::StoreLayout;
use faktur_numbering::{render, Variables};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime};

/// The persistent store for one storage root.
///
/// # Lifecycle
///
/// ```rust,ignore
/// let store = Store::new("/home/user/.faktur");
/// store.initialize()?;                 // load + migrate, or create fresh
/// let record = store.record()?;        // clone of the resident record
/// store.mutate(|r| r.settings.currency = "USD".into())?;  // apply + flush
/// ```
pub struct Store {
    layout: StoreLayout,
    resident: RwLock<Option<DatabaseRecord>>,
}

impl Store {
    /// Creates a handle for `root`. No I/O happens until
    /// [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: StoreLayout::new(root.into()),
            resident: RwLock::new(None),
        }
    }

    /// The storage root this handle is bound to.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Brings the store up.
    ///
    /// Ensures the directory tree exists, then loads the database record:
    /// a stored record behind the current schema version is migrated and
    /// re-persisted immediately; a missing record is created fresh at the
    /// current version. A database file that is present but unreadable or
    /// unparsable fails with [`CoreError::InitializationFailed`] — the
    /// store never fabricates a fresh record over a damaged one.
    pub fn initialize(&self) -> CoreResult<()> {
        let catalog = MigrationCatalog::builtin();
        catalog.validate()?;

        self.layout.ensure_directories()?;
        let db_path = self.layout.database_path();

        let record = match faktur_fsio::read_json_value(&db_path) {
            Ok(raw) => {
                let stored = raw
                    .get("version")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let was_stale = needs_migration(&stored);
                let value = if was_stale {
                    tracing::info!(
                        from = %stored,
                        to = CURRENT_SCHEMA_VERSION,
                        "migrating database record"
                    );
                    catalog.run(raw)?
                } else {
                    raw
                };
                let record: DatabaseRecord = serde_json::from_value(value).map_err(|e| {
                    CoreError::initialization_failed(format!(
                        "database record does not match schema {CURRENT_SCHEMA_VERSION}: {e}"
                    ))
                })?;
                if record.version != CURRENT_SCHEMA_VERSION {
                    return Err(CoreError::initialization_failed(format!(
                        "database record version {} is not supported by this build \
                         (current is {CURRENT_SCHEMA_VERSION})",
                        record.version
                    )));
                }
                if was_stale {
                    faktur_fsio::write_json(&db_path, &record)?;
                }
                record
            }
            Err(e) if e.is_not_found() => {
                let record = DatabaseRecord::new_default();
                faktur_fsio::write_json(&db_path, &record)?;
                tracing::info!(root = %self.layout.root().display(), "created fresh database record");
                record
            }
            Err(e) => {
                return Err(CoreError::initialization_failed(format!(
                    "database file is present but unusable: {e}"
                )));
            }
        };

        *self.resident.write() = Some(record);
        Ok(())
    }

    /// A clone of the resident database record.
    pub fn record(&self) -> CoreResult<DatabaseRecord> {
        self.resident
            .read()
            .clone()
            .ok_or(CoreError::NotInitialized)
    }

    /// Applies an in-place update to the resident record, then persists
    /// the whole record atomically. The only sanctioned mutation path.
    pub fn mutate(&self, f: impl FnOnce(&mut DatabaseRecord)) -> CoreResult<()> {
        self.mutate_with(f)
    }

    /// Apply-then-flush with a return value, used internally by operations
    /// that must read something out of the same lock-held update.
    ///
    /// The update runs on a working copy and is installed only after the
    /// flush succeeds, so a failed write never leaves the resident record
    /// ahead of the file.
    fn mutate_with<R>(&self, f: impl FnOnce(&mut DatabaseRecord) -> R) -> CoreResult<R> {
        let mut guard = self.resident.write();
        let record = guard.as_mut().ok_or(CoreError::NotInitialized)?;
        let mut updated = record.clone();
        let out = f(&mut updated);
        faktur_fsio::write_json(&self.layout.database_path(), &updated)?;
        *record = updated;
        Ok(out)
    }

    /// Draws the next document number for `kind`.
    ///
    /// Bumps the all-time and per-year counters through the sanctioned
    /// mutation path (so they are flushed atomically with the record) and
    /// renders the configured template. `date` defaults to today (UTC).
    pub fn next_document_number(
        &self,
        kind: DocumentKind,
        date: Option<Date>,
    ) -> CoreResult<String> {
        let date = date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
        self.mutate_with(|record| {
            let s = &mut record.settings;
            let (prefix, format, counter, year_counters) = match kind {
                DocumentKind::Invoice => (
                    &s.invoice_prefix,
                    &s.invoice_number_format,
                    &mut s.invoice_counter,
                    &mut s.invoice_year_counters,
                ),
                DocumentKind::Offer => (
                    &s.offer_prefix,
                    &s.offer_number_format,
                    &mut s.offer_counter,
                    &mut s.offer_year_counters,
                ),
            };
            *counter += 1;
            let year_counter = year_counters.entry(date.year()).or_insert(0);
            *year_counter += 1;

            let vars = Variables::build(prefix, *counter, *year_counter, Some(date));
            render(format, &vars)
        })
    }

    /// Replaces the number template for `kind`, gated on validation.
    ///
    /// An invalid template is rejected with [`CoreError::InvalidTemplate`]
    /// and the previous template stays in effect; the failure is meant to
    /// be surfaced at the settings UI, never to crash document creation.
    pub fn set_number_format(&self, kind: DocumentKind, template: &str) -> CoreResult<()> {
        faktur_numbering::ensure_valid(template)?;
        self.mutate(|record| {
            let slot = match kind {
                DocumentKind::Invoice => &mut record.settings.invoice_number_format,
                DocumentKind::Offer => &mut record.settings.offer_number_format,
            };
            *slot = template.to_string();
        })
    }

    /// Writes a document to its archive, partitioned by creation year.
    pub fn save_document(&self, document: &Document) -> CoreResult<PathBuf> {
        let path = self.layout.document_path(
            document.doc_type,
            document.year(),
            &document.document_number,
        );
        faktur_fsio::write_json(&path, &DocumentFile::new(document.clone()))?;
        Ok(path)
    }

    /// Loads a document by its entity id, scanning every year partition.
    pub fn load_by_id(&self, kind: DocumentKind, id: &str) -> CoreResult<Document> {
        self.find_by_id(kind, id).map(|(_, doc)| doc)
    }

    /// Loads a document by its number.
    ///
    /// With a known year the path is computed directly; otherwise every
    /// year partition is scanned.
    pub fn load_by_number(
        &self,
        kind: DocumentKind,
        number: &str,
        year: Option<i32>,
    ) -> CoreResult<Document> {
        match year {
            Some(year) => {
                let path = self.layout.document_path(kind, year, number);
                match faktur_fsio::read_json::<DocumentFile>(&path) {
                    Ok(file) => Ok(file.document),
                    Err(e) if e.is_not_found() => Err(CoreError::document_not_found(number)),
                    Err(e) => Err(e.into()),
                }
            }
            None => self
                .scan(kind)?
                .into_iter()
                .map(|(_, doc)| doc)
                .find(|doc| doc.document_number == number)
                .ok_or_else(|| CoreError::document_not_found(number)),
        }
    }

    /// Deletes a document's file by entity id. Irreversible.
    pub fn delete_document(&self, kind: DocumentKind, id: &str) -> CoreResult<()> {
        let (path, _) = self.find_by_id(kind, id)?;
        faktur_fsio::remove_file_if_exists(&path)?;
        Ok(())
    }

    /// Lists all documents of a kind, newest first by creation timestamp.
    pub fn list(&self, kind: DocumentKind) -> CoreResult<Vec<Document>> {
        let mut documents: Vec<Document> =
            self.scan(kind)?.into_iter().map(|(_, doc)| doc).collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    /// Converts an offer into a new invoice.
    ///
    /// Draws an invoice number, persists the new invoice, and records the
    /// forward reference on the offer — the only mutation the original
    /// ever receives.
    pub fn convert_offer_to_invoice(&self, offer_id: &str) -> CoreResult<Document> {
        let (offer_path, mut offer) = self.find_by_id(DocumentKind::Offer, offer_id)?;
        if offer.converted_to_invoice_id.is_some() {
            return Err(CoreError::invalid_operation(format!(
                "offer {} was already converted",
                offer.document_number
            )));
        }

        let now = OffsetDateTime::now_utc();
        let number = self.next_document_number(DocumentKind::Invoice, Some(now.date()))?;
        let invoice = offer.convert_to_invoice(number, now)?;
        self.save_document(&invoice)?;

        offer.converted_to_invoice_id = Some(invoice.id.clone());
        offer.updated_at = now;
        faktur_fsio::write_json(&offer_path, &DocumentFile::new(offer))?;

        Ok(invoice)
    }

    /// Relocates the whole store to a new root.
    ///
    /// Copies the database file and both archives, rebinds this handle to
    /// the new root, and optionally removes the old tree. Removal failures
    /// are logged, not fatal: the copy already succeeded and the new root
    /// is authoritative.
    pub fn migrate_to_new_path(
        &mut self,
        new_root: impl Into<PathBuf>,
        remove_old: bool,
    ) -> CoreResult<()> {
        let new_layout = StoreLayout::new(new_root.into());
        new_layout.ensure_directories()?;

        let old_db = self.layout.database_path();
        if old_db.exists() {
            fs::copy(&old_db, new_layout.database_path())?;
        }
        for kind in [DocumentKind::Offer, DocumentKind::Invoice] {
            faktur_fsio::copy_tree(&self.layout.kind_dir(kind), &new_layout.kind_dir(kind))?;
        }

        let old_layout = std::mem::replace(&mut self.layout, new_layout);
        tracing::info!(
            from = %old_layout.root().display(),
            to = %self.layout.root().display(),
            "store relocated"
        );

        if remove_old {
            if let Err(e) = fs::remove_dir_all(old_layout.root()) {
                tracing::warn!(
                    path = %old_layout.root().display(),
                    error = %e,
                    "could not remove old storage root"
                );
            }
        }
        Ok(())
    }

    /// Deletes all documents and resets the database record to a fresh
    /// default. Irreversible; confirmation is the caller's responsibility.
    pub fn reset_all_data(&self) -> CoreResult<()> {
        if self.resident.read().is_none() {
            return Err(CoreError::NotInitialized);
        }

        for kind in [DocumentKind::Offer, DocumentKind::Invoice] {
            let dir = self.layout.kind_dir(kind);
            match fs::remove_dir_all(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            fs::create_dir_all(&dir)?;
        }

        let fresh = DatabaseRecord::new_default();
        faktur_fsio::write_json(&self.layout.database_path(), &fresh)?;
        *self.resident.write() = Some(fresh);
        tracing::info!(root = %self.layout.root().display(), "store reset to defaults");
        Ok(())
    }

    /// Finds a document and its file path by entity id.
    fn find_by_id(&self, kind: DocumentKind, id: &str) -> CoreResult<(PathBuf, Document)> {
        self.scan(kind)?
            .into_iter()
            .find(|(_, doc)| doc.id == id)
            .ok_or_else(|| CoreError::document_not_found(id))
    }

    /// Reads every document of a kind. No secondary index exists; a
    /// linear scan over the year partitions is the deliberate tradeoff at
    /// the tool's data volumes.
    fn scan(&self, kind: DocumentKind) -> CoreResult<Vec<(PathBuf, Document)>> {
        let kind_dir = self.layout.kind_dir(kind);
        let mut found = Vec::new();
        if !kind_dir.exists() {
            return Ok(found);
        }

        for year_entry in fs::read_dir(&kind_dir)? {
            let year_entry = year_entry?;
            if !year_entry.file_type()?.is_dir() {
                continue;
            }
            for file_entry in fs::read_dir(year_entry.path())? {
                let path = file_entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let file: DocumentFile = faktur_fsio::read_json(&path)?;
                found.push((path, file.document));
            }
        }
        Ok(found)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.layout.root())
            .field("initialized", &self.resident.read().is_some())
            .finish_non_exhaustive()
    }
}
