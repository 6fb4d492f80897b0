//! # Faktur FS I/O
//!
//! Crash-safe JSON file I/O for the Faktur document store.
//!
//! This crate is the lowest layer of the store. It reads and writes single
//! JSON documents with all-or-nothing semantics:
//!
//! - Reads report typed failures ([`FsError::NotFound`],
//!   [`FsError::PermissionDenied`], [`FsError::Malformed`]) instead of
//!   collapsing everything into an opaque I/O error.
//! - Writes go to a temporary file in the destination directory, are synced,
//!   and then renamed over the destination. A crash or power loss mid-write
//!   leaves either the previous complete file or the new complete file on
//!   disk, never a torn one.
//!
//! Files are written pretty-printed so users can inspect their data with a
//! text editor.
//!
//! ## Example
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use std::path::Path;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Note { text: String }
//!
//! let note = Note { text: "hello".into() };
//! faktur_fsio::write_json(Path::new("data/note.json"), &note).unwrap();
//! let back: Note = faktur_fsio::read_json(Path::new("data/note.json")).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod json;

pub use error::{FsError, FsResult};
pub use json::{copy_tree, read_json, read_json_value, remove_file_if_exists, write_json};
