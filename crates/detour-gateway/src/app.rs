use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    bulk_delete_handler, create_handler, delete_handler, export_handler, health_handler,
    import_handler, index_handler, list_json_handler, update_handler,
};
use crate::state::AppState;

pub const INDEX_PATH: &str = "/redirects";
pub const LIST_JSON_PATH: &str = "/redirects.json";
pub const CREATE_PATH: &str = "/redirects/create";
pub const UPDATE_PATH: &str = "/redirects/update";
pub const DELETE_PATH: &str = "/redirects/delete";
pub const BULK_DELETE_PATH: &str = "/redirects/bulk-delete";
pub const EXPORT_PATH: &str = "/redirects/export.csv";
pub const IMPORT_PATH: &str = "/redirects/import";

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(INDEX_PATH, get(index_handler))
            .route(LIST_JSON_PATH, get(list_json_handler))
            .route(CREATE_PATH, post(create_handler))
            .route(UPDATE_PATH, post(update_handler))
            .route(DELETE_PATH, post(delete_handler))
            .route(BULK_DELETE_PATH, post(bulk_delete_handler))
            .route(EXPORT_PATH, get(export_handler))
            .route(IMPORT_PATH, post(import_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
