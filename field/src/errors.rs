//! Error types for field parsing.

use thiserror::Error;

/// Errors produced while decoding field elements or field names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A hex constant with no digits, e.g. `const-mul-`.
    #[error("empty hex string")]
    EmptyHex,

    /// `digit` is not in `[0-9a-fA-F]`.
    #[error("invalid hex digit {digit:?} in {input:?}")]
    InvalidHexDigit { input: String, digit: char },

    /// The name matches none of the supported prime fields.
    #[error("unsupported prime field name: {0}")]
    UnknownFieldName(String),
}
