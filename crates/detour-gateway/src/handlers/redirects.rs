use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::Json;
use detour_admin::{
    BulkDeleteRequest, CreateRedirectRequest, DeleteRedirectRequest, UpdateRedirectRequest,
};
use detour_core::status::default_status_code_labels;
use detour_core::ReadRedirectStorage;
use detour_listing::{host_options, Actions, Bootstrap, NO_STATUS_CODE_FILTER};
use tracing::debug;

use super::{requested_account, respond};
use crate::app::{
    BULK_DELETE_PATH, CREATE_PATH, DELETE_PATH, EXPORT_PATH, IMPORT_PATH, UPDATE_PATH,
};
use crate::error::Result;
use crate::model::{Arguments, ListQuery, ResponseFormat};
use crate::page::render_index;
use crate::state::AppState;

async fn load_bootstrap(state: &AppState, query: ListQuery) -> Result<Bootstrap> {
    let redirects = state.admin().storage().get_all(None).await?;
    let settings = state.settings();
    let options = state.admin().options();

    Ok(Bootstrap {
        host_options: host_options(settings.hosts.iter().map(String::as_str), &redirects),
        redirects,
        actions: Actions {
            create: CREATE_PATH.to_string(),
            update: UPDATE_PATH.to_string(),
            delete: DELETE_PATH.to_string(),
            bulk_delete: BULK_DELETE_PATH.to_string(),
            export: EXPORT_PATH.to_string(),
            import: IMPORT_PATH.to_string(),
        },
        status_codes: default_status_code_labels(),
        csrf_token: settings.csrf_token.clone().unwrap_or_default(),
        valid_source_uri_path_pattern: options.source_uri_path_pattern().to_string(),
        default_status_code: options.default_status_code,
        initial_status_code_filter: query.status_code.unwrap_or(NO_STATUS_CODE_FILTER),
        initial_type_filter: query.redirect_type.unwrap_or_default(),
        show_hit_count: settings.show_hit_count,
    })
}

pub async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let messages = query
        .flash
        .map(|ticket| state.take_flash_messages(ticket))
        .unwrap_or_default();
    let search = query.search.clone().unwrap_or_default();
    let bootstrap = load_bootstrap(&state, query).await?;
    debug!(
        redirects = bootstrap.redirects.len(),
        messages = messages.len(),
        "rendering redirect list"
    );
    Ok(Html(render_index(&bootstrap, &search, &messages)))
}

pub async fn list_json_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Bootstrap>> {
    Ok(Json(load_bootstrap(&state, query).await?))
}

pub async fn create_handler(
    State(state): State<AppState>,
    format: ResponseFormat,
    headers: HeaderMap,
    Arguments(request): Arguments<CreateRedirectRequest>,
) -> Response {
    let creator = state.creator(requested_account(&headers));
    let outcome = state.admin().create(request, creator.as_deref()).await;
    let messages = outcome.messages.clone();
    respond(&state, format, outcome, messages)
}

pub async fn update_handler(
    State(state): State<AppState>,
    format: ResponseFormat,
    headers: HeaderMap,
    Arguments(request): Arguments<UpdateRedirectRequest>,
) -> Response {
    let creator = state.creator(requested_account(&headers));
    let outcome = state.admin().update(request, creator.as_deref()).await;
    let messages = outcome.messages.clone();
    respond(&state, format, outcome, messages)
}

pub async fn delete_handler(
    State(state): State<AppState>,
    format: ResponseFormat,
    Arguments(request): Arguments<DeleteRedirectRequest>,
) -> Response {
    let outcome = state.admin().delete(request).await;
    let messages = outcome.messages.clone();
    respond(&state, format, outcome, messages)
}

pub async fn bulk_delete_handler(
    State(state): State<AppState>,
    format: ResponseFormat,
    Arguments(request): Arguments<BulkDeleteRequest>,
) -> Response {
    let outcome = state.admin().bulk_delete(request).await;
    let messages = outcome.messages.clone();
    respond(&state, format, outcome, messages)
}
