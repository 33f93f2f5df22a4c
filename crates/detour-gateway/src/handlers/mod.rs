mod health;
mod redirects;
mod transfer;

pub use health::health_handler;
pub use redirects::{
    bulk_delete_handler, create_handler, delete_handler, index_handler, list_json_handler,
    update_handler,
};
pub use transfer::{export_handler, import_handler};

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use detour_admin::FlashMessage;
use serde::Serialize;

use crate::app::INDEX_PATH;
use crate::model::{ResponseFormat, FLASH_QUERY};
use crate::state::AppState;

/// Header naming the account a mutation is performed for.
pub const ACCOUNT_HEADER: &str = "x-detour-account";

fn requested_account(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Answers a mutation as JSON, or parks its messages under a ticket and goes
/// back to the list.
fn respond<B: Serialize>(
    state: &AppState,
    format: ResponseFormat,
    body: B,
    messages: Vec<FlashMessage>,
) -> Response {
    match format {
        ResponseFormat::Json => Json(body).into_response(),
        ResponseFormat::Page => match state.push_flash_messages(messages) {
            Some(ticket) => {
                Redirect::to(&format!("{INDEX_PATH}?{FLASH_QUERY}={ticket}")).into_response()
            }
            None => Redirect::to(INDEX_PATH).into_response(),
        },
    }
}
