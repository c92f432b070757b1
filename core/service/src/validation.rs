//! Structural checks on inbound envelopes.
//!
//! Validation only checks shape. A structurally valid envelope can still
//! fail to decrypt.

use sealfield_common::{Error, Violation};
use sealfield_crypto::Envelope;

/// Message attached to a missing required field.
pub const NOT_NULL: &str = "must not be null";

/// Every violation found in one envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// True when no violations were found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// `Ok(())` when valid, otherwise a validation error with the full list.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::Validation(self.violations))
        }
    }
}

/// Checks an envelope before any cipher work is attempted.
pub trait EnvelopeValidator: Send + Sync {
    fn validate(&self, envelope: &Envelope) -> ValidationResult;
}

/// Requires `salt`, `iv` and `value` to be present.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl EnvelopeValidator for StructuralValidator {
    fn validate(&self, envelope: &Envelope) -> ValidationResult {
        validate(envelope)
    }
}

/// Report every missing required field, in wire order.
pub fn validate(envelope: &Envelope) -> ValidationResult {
    let fields = [
        ("salt", envelope.salt.is_some()),
        ("iv", envelope.iv.is_some()),
        ("value", envelope.ciphertext.is_some()),
    ];

    ValidationResult::new(
        fields
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(field, _)| Violation::new(field, NOT_NULL))
            .collect(),
    )
}
