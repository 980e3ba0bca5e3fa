//! Configuration validation utilities

use crate::errors::LedgerError;
use std::fmt;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is below its lower bound
    TooSmall {
        /// Field path
        field: String,
        /// Inclusive minimum
        min: u128,
        /// Actual value
        actual: u128,
    },
    /// Two fields violate an ordering constraint
    Ordering {
        /// Field expected to be smaller or equal
        lower: String,
        /// Field expected to be larger or equal
        upper: String,
    },
    /// Custom validation failed
    Custom {
        /// Field path
        field: String,
        /// Failure description
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooSmall { field, min, actual } => {
                write!(f, "Field '{field}' must be at least {min} (got {actual})")
            }
            ValidationError::Ordering { lower, upper } => {
                write!(f, "Field '{lower}' must not exceed '{upper}'")
            }
            ValidationError::Custom { field, message } => {
                write!(f, "Field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::invalid_config(err.to_string())
    }
}

/// Accumulates validation failures so every problem is reported at once
#[derive(Debug, Default)]
pub struct ConfigValidator {
    errors: Vec<ValidationError>,
    field_prefix: String,
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator for a nested section
    pub fn for_field(&self, field_name: &str) -> Self {
        Self {
            errors: Vec::new(),
            field_prefix: self.path(field_name),
        }
    }

    fn path(&self, field: &str) -> String {
        if self.field_prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.field_prefix, field)
        }
    }

    /// Require `actual >= min`
    pub fn at_least(&mut self, field: &str, actual: u128, min: u128) -> &mut Self {
        if actual < min {
            self.errors.push(ValidationError::TooSmall {
                field: self.path(field),
                min,
                actual,
            });
        }
        self
    }

    /// Require `lower <= upper`
    pub fn ordered(
        &mut self,
        lower_field: &str,
        lower: u128,
        upper_field: &str,
        upper: u128,
    ) -> &mut Self {
        if lower > upper {
            self.errors.push(ValidationError::Ordering {
                lower: self.path(lower_field),
                upper: self.path(upper_field),
            });
        }
        self
    }

    /// Record a failure when `ok` is false
    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(ValidationError::Custom {
                field: self.path(field),
                message: message.to_string(),
            });
        }
        self
    }

    /// Fold a nested validator's failures into this one
    pub fn merge(&mut self, nested: ConfigValidator) -> &mut Self {
        self.errors.extend(nested.errors);
        self
    }

    /// Collected failures
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Finish validation, joining all failures into one error
    pub fn finish(self) -> Result<(), LedgerError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let message = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(LedgerError::invalid_config(message))
    }
}
