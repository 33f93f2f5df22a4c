//! Redirect storage backends.

pub mod memory;
pub mod mysql;

pub use detour_core::error::{Result, StorageError};
pub use detour_core::storage::{ReadRedirectStorage, RedirectStorage};
pub use memory::InMemoryRedirectStorage;
pub use mysql::MySqlRedirectStorage;
