//! # Faktur Numbering
//!
//! Document number template engine.
//!
//! Users configure how their offer and invoice numbers look with a small
//! template grammar: literal text interspersed with `{NAME}` or
//! `{NAME:WIDTH}` placeholders, e.g. `"{PREFIX}-{YEAR}-{NUMBER:4}"`.
//!
//! The engine deliberately splits two concerns:
//!
//! - [`validate`] produces a full report (errors, warnings, variables used)
//!   so a settings UI can reject an unusable template before it is saved.
//! - [`render`] is total: it never fails, substituting what it recognizes
//!   and passing anything else through verbatim. A previously saved
//!   template that later became invalid degrades gracefully instead of
//!   blocking document creation.
//!
//! ## Example
//!
//! ```
//! use faktur_numbering::{render, Variables};
//! use time::macros::date;
//!
//! let vars = Variables::build("INV", 42, 7, Some(date!(2026 - 03 - 15)));
//! assert_eq!(render("{PREFIX}-{YEAR}-{NUMBER:4}", &vars), "INV-2026-0042");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod template;

pub use template::{
    ensure_valid, render, validate, TemplateError, Validation, Variable, Variables,
};
