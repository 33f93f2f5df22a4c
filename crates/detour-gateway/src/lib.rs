//! HTTP surface of the redirect administration.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod page;
pub mod state;

pub use app::App;
pub use error::AppError;
pub use state::{Admin, AppState, GatewaySettings};
