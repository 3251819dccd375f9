use thiserror::Error;

use crate::header::ImportField;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberParseError {
    #[error("empty number")]
    Empty,

    #[error("invalid number: {0:?}")]
    Invalid(String),

    #[error("number out of range: {0:?}")]
    OutOfRange(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("sheet has no rows")]
    EmptySheet,

    #[error("required column not found: {0}")]
    MissingColumn(ImportField),
}
