//! CLI command implementations.

pub mod check_format;
pub mod inspect;
pub mod migrate;
pub mod relocate;
pub mod reset;
