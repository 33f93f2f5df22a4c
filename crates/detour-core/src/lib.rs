//! Core types and traits for the Detour redirect administration.
//!
//! This crate provides the redirect model, the canonical host
//! representation and the storage contract shared by the admin
//! controller, the storage backends and the list engine.

pub mod datetime;
pub mod error;
pub mod host;
pub mod markup;
pub mod redirect;
pub mod status;
pub mod storage;

pub use error::{CoreError, StorageError};
pub use host::Host;
pub use redirect::{NewRedirect, Redirect, RedirectIdentity, RedirectType};
pub use storage::{ReadRedirectStorage, RedirectStorage};
