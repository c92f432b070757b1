//! Common utilities and types shared across Sealfield crates.
//!
//! This module provides the single error type surfaced by every crypto
//! operation, plus the small value types that travel with it.

pub mod error;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use types::{SensitiveBytes, Violation};
