//! Error types raised while validating or decoding rule definitions.

use thiserror::Error;

/// Rejections raised at the edit-form boundary.
///
/// A group that fails validation is never persisted, so these errors are
/// meant to be shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("workflow name cannot be empty")]
    EmptyLabel,

    #[error("a workflow named \"{0}\" already exists")]
    DuplicateLabel(String),

    #[error("unknown form field `{0}`")]
    UnknownField(String),

    #[error("invalid value for form field `{0}`")]
    InvalidField(String),

    #[error("invalid {section} row `{id}`: {message}")]
    InvalidRow {
        section: &'static str,
        id: String,
        message: String,
    },
}

/// Failures parsing a `category:key` roll request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollRequestError {
    #[error("roll type `{0}` is not of the form `category:key`")]
    MissingSeparator(String),

    #[error("unknown roll category `{0}`")]
    UnknownCategory(String),

    #[error("roll type `{0}` names no ability or skill")]
    EmptyKey(String),
}
