use crate::message::Severity;
use detour_core::{RedirectIdentity, StorageError};
use thiserror::Error;

/// Type alias for admin results.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Which end of the activity window a date belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

/// Field level problems found before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("source uri path must not be empty")]
    EmptySourceUriPath,
    #[error("source and target uri path are the same")]
    SameSourceAndTarget,
    #[error("source uri path does not match {pattern}")]
    SourceUriPathNotValid { pattern: String },
    #[error("status code {0} requires a target uri path")]
    MissingTargetUriPath(u16),
    #[error("invalid status code: {0}")]
    InvalidStatusCode(String),
}

#[derive(Debug, Clone, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a redirect already exists at {0}")]
    Conflict(RedirectIdentity),
    #[error("a different redirect already exists at {0}")]
    NotCreated(RedirectIdentity),
    #[error("no redirect exists at {0}")]
    NotFound(RedirectIdentity),
    #[error("invalid {field:?} date time: {value}")]
    InvalidDate { field: DateField, value: String },
    #[error("csv is malformed: {0}")]
    ImportFormat(String),
    #[error("csv upload is not accessible: {0}")]
    ImportResource(String),
    #[error("no csv file was uploaded")]
    MissingUpload,
    #[error("csv could not be written: {0}")]
    Export(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AdminError {
    /// Message id used to describe the error to the user.
    pub fn message_id(&self) -> &'static str {
        match self {
            AdminError::Validation(error) => match error {
                ValidationError::EmptySourceUriPath => "error.sourceUriPathEmpty",
                ValidationError::SameSourceAndTarget => "error.sameSourceAndTarget",
                ValidationError::SourceUriPathNotValid { .. } => "error.sourceUriPathNotValid",
                ValidationError::MissingTargetUriPath(_) => "error.targetUriPathRequired",
                ValidationError::InvalidStatusCode(_) => "error.invalidStatusCode",
            },
            AdminError::Conflict(_) => "error.redirectExists",
            AdminError::NotCreated(_) => "error.redirectDiffers",
            AdminError::NotFound(_) => "error.redirectNotFound",
            AdminError::InvalidDate {
                field: DateField::Start,
                ..
            } => "error.invalidStartDateTime",
            AdminError::InvalidDate {
                field: DateField::End,
                ..
            } => "error.invalidEndDateTime",
            AdminError::ImportFormat(_) => "error.importCsvFailed",
            AdminError::ImportResource(_) => "error.importResourceFailed",
            AdminError::MissingUpload => "error.csvFileNotSet",
            AdminError::Export(_) => "error.exportCsvFailed",
            AdminError::Storage(_) => "error.storageFailed",
        }
    }

    /// Positional arguments for the translated message.
    pub fn message_arguments(&self) -> Vec<String> {
        match self {
            AdminError::Validation(ValidationError::SourceUriPathNotValid { pattern }) => {
                vec![pattern.clone()]
            }
            AdminError::Validation(ValidationError::MissingTargetUriPath(code)) => {
                vec![code.to_string()]
            }
            AdminError::Validation(ValidationError::InvalidStatusCode(raw)) => vec![raw.clone()],
            AdminError::Conflict(identity)
            | AdminError::NotCreated(identity)
            | AdminError::NotFound(identity) => vec![identity.to_string()],
            AdminError::ImportFormat(reason)
            | AdminError::ImportResource(reason)
            | AdminError::Export(reason) => vec![reason.clone()],
            AdminError::Storage(error) => vec![error.to_string()],
            _ => Vec::new(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AdminError::Validation(ValidationError::InvalidStatusCode(_)) => Severity::Error,
            AdminError::Validation(_) | AdminError::NotCreated(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
