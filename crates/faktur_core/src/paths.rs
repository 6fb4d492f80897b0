//! Storage root layout.
//!
//! ```text
//! <root>/
//! ├─ database.json        # singleton database record
//! ├─ offers/
//! │  └─ <year>/<number>.json
//! └─ invoices/
//!    └─ <year>/<number>.json
//! ```

use crate::model::DocumentKind;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the database record.
pub const DATABASE_FILE: &str = "database.json";

/// Resolves paths within a storage root.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    /// Creates a layout rooted at `root`. No I/O happens here.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the database record file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    /// Archive directory for a document kind.
    #[must_use]
    pub fn kind_dir(&self, kind: DocumentKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Year partition directory for a document kind.
    #[must_use]
    pub fn year_dir(&self, kind: DocumentKind, year: i32) -> PathBuf {
        self.kind_dir(kind).join(year.to_string())
    }

    /// Path of an individual document file.
    #[must_use]
    pub fn document_path(&self, kind: DocumentKind, year: i32, number: &str) -> PathBuf {
        self.year_dir(kind, year).join(format!("{number}.json"))
    }

    /// Creates the root and both entity directories. Idempotent.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(self.kind_dir(DocumentKind::Offer))?;
        fs::create_dir_all(self.kind_dir(DocumentKind::Invoice))?;
        Ok(())
    }
}
