use thiserror::Error;

use std::fmt;

use crate::trigger::{TriggerId, TriggerKind};

/// Why a secondary data string is not a well-formed hex value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecondaryDataError {
    #[error("secondary data is required")]
    Empty,

    #[error("secondary data '{0}' must start with 0x")]
    MissingPrefix(String),

    #[error("secondary data '{0}' must have 1 to 8 hex digits after 0x")]
    DigitCount(String),

    #[error("secondary data '{0}' contains non-hex characters")]
    NotHex(String),
}

/// Form field a validation message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Kind,
    Modes,
    AccessType,
    SecondaryData,
    Count,
    Action,
    Match,
    MaskMax,
    SizeLo,
    SizeHi,
    Id,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Kind => "kind",
            Field::Modes => "modes",
            Field::AccessType => "access_type",
            Field::SecondaryData => "secondary_data",
            Field::Count => "count",
            Field::Action => "action",
            Field::Match => "match",
            Field::MaskMax => "maskmax",
            Field::SizeLo => "sizelo",
            Field::SizeHi => "sizehi",
            Field::Id => "id",
        };
        f.write_str(name)
    }
}

/// A single human-readable validation message tied to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every validation message collected for one step, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record the error side of a check, returning the success value if any.
    pub fn collect<T>(&mut self, field: Field, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Errors returned by the trigger wizard.
///
/// None of these close the wizard: a rejected transition leaves it in the
/// step it was in.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("trigger kind '{0}' is not yet supported")]
    UnsupportedKind(TriggerKind),

    #[error("wizard state error: {0}")]
    State(String),
}

/// Errors returned by the trigger collection.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("trigger {0} not found")]
    NotFound(TriggerId),

    #[error("trigger {0} already exists")]
    DuplicateId(TriggerId),

    #[error("trigger capacity of {0} reached")]
    CapacityExceeded(usize),

    #[error("invalid trigger: {0}")]
    Invalid(ValidationErrors),
}
