//! Redirect administration: the mutation controller and its collaborators.
//!
//! [`RedirectAdmin`] validates create, update and delete requests, applies
//! them to a [`detour_core::RedirectStorage`] and reports every outcome as
//! translated [`FlashMessage`]s. CSV import and export live here as well.

pub mod admin;
pub mod error;
pub mod export;
pub mod import;
pub mod message;
pub mod options;
pub mod request;
pub mod translator;

pub use admin::{is_same, BulkDeleteOutcome, DeleteOutcome, MutationOutcome, RedirectAdmin};
pub use error::{AdminError, DateField, ValidationError};
pub use export::{export_filename, ExportOptions};
pub use import::{ImportReport, ProtocolEntry, ProtocolEntryType};
pub use message::{FlashMessage, Severity};
pub use options::ValidationOptions;
pub use request::{
    BulkDeleteRequest, CreateRedirectRequest, DeleteRedirectRequest, RedirectCommand,
    StatusCodeInput, UpdateRedirectRequest,
};
pub use translator::{Catalog, Translator};
