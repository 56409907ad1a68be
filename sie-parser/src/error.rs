use std::fmt;

use sie_core::EncodeError;
use thiserror::Error;

/// What went wrong on a row. Readers never stop on these; they are collected as [`Diagnostic`]s.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum DiagnosticKind {
    #[error("Row does not start with a '#'")]
    MissingLabel,
    #[error("Post '{keyword}' is missing parameter {index}")]
    MissingParameter { keyword: String, index: usize },
    #[error("Post '{keyword}' does not have {count} parameters, parameter {missing} is missing")]
    TooFewParameters {
        keyword: String,
        count: usize,
        missing: usize,
    },
    #[error("Post '{keyword}' has invalid value '{value}'")]
    InvalidValue { keyword: String, value: String },
    #[error("Post '{keyword}' parameter {index} ('{value}') is not a valid year index")]
    InvalidYearIndex {
        keyword: String,
        index: usize,
        value: String,
    },
    #[error("Post '{keyword}' parameter {index} ('{value}') is not a valid year")]
    InvalidYear {
        keyword: String,
        index: usize,
        value: String,
    },
    #[error("Post '{keyword}' parameter {index} ('{value}') is not a valid period")]
    InvalidPeriod {
        keyword: String,
        index: usize,
        value: String,
    },
    #[error("Post '{keyword}' parameter {index} ('{value}') is not a valid date")]
    InvalidDate {
        keyword: String,
        index: usize,
        value: String,
    },
    #[error("Post '{keyword}' parameter {index} ('{value}') is not a valid number")]
    InvalidNumber {
        keyword: String,
        index: usize,
        value: String,
    },
    #[error("Post '{keyword}' dimensions invalid")]
    InvalidObjectList { keyword: String },
    #[error("Account type {value} is unknown")]
    UnknownAccountType { value: String },
    #[error("Account {account} is not declared")]
    UndeclaredAccount { account: String },
    #[error("Only format PC8 is allowed")]
    UnsupportedFormat { value: Option<String> },
    #[error("Post #VER was not followed by '{{'")]
    VerificationNotOpened,
    #[error("Post #VER was not closed with a '}}'")]
    VerificationNotClosed,
    #[error("Post #VER sum of rows is not zero")]
    VerificationUnbalanced,
    #[error("Post '#KSUMMA' has invalid checksum '{value}'")]
    InvalidChecksum { value: String },
    #[error("Checksum mismatch, file says {expected} but content gives {calculated}")]
    ChecksumMismatch { expected: u32, calculated: u32 },
    #[error("Closing '#KSUMMA' without an opening '#KSUMMA'")]
    ChecksumNotStarted,
    #[error("Opening '#KSUMMA' was never closed")]
    ChecksumNotClosed,
    #[error("Could not checksum post: {0}")]
    ChecksumEncoding(EncodeError),
}

/// A [`DiagnosticKind`] tagged with the 1-based row it was found on.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub row: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (row {})", self.kind, self.row)
    }
}

impl std::error::Error for Diagnostic {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Errors and warnings of one read, each in row order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub(crate) fn error(&mut self, kind: DiagnosticKind, row: usize) {
        log::debug!("event=sie_read_error module=reader row={} error={}", row, kind);
        self.errors.push(Diagnostic { kind, row });
    }

    pub(crate) fn warning(&mut self, kind: DiagnosticKind, row: usize) {
        log::warn!("event=sie_read_warning module=reader row={} warning={}", row, kind);
        self.warnings.push(Diagnostic { kind, row });
    }
}
