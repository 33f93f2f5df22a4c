use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use detour_admin::{export_filename, AdminError, ExportOptions};
use detour_core::Host;
use jiff::Timestamp;
use tracing::{info, warn};

use super::{requested_account, respond};
use crate::error::{AppError, Result};
use crate::model::{is_checked, ExportQuery, ResponseFormat, CSRF_HEADER, CSRF_TOKEN_KEY};
use crate::state::AppState;

const CSV_FILE_FIELD: &str = "csvFile";
const DELIMITER_FIELD: &str = "delimiter";

pub async fn export_handler(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let options = ExportOptions::builder()
        .include_inactive(is_checked(query.include_inactive_redirects.as_deref()))
        .include_generated(is_checked(query.include_generated_redirects.as_deref()))
        .host(Host::normalize(query.host.as_deref()))
        .build();

    let csv = state
        .admin()
        .export_csv(&options)
        .await
        .map_err(|error| AppError::Failed(state.admin().error_message(&error)))?;

    let filename = export_filename(Timestamp::now());
    info!(filename = %filename, "sending redirect export");
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Fields of the import form.
#[derive(Debug, Default)]
struct ImportUpload {
    csv: Option<Vec<u8>>,
    delimiter: String,
    csrf_token: Option<String>,
}

fn unreadable(error: MultipartError) -> AdminError {
    AdminError::ImportResource(error.body_text())
}

async fn read_upload(
    multipart: &mut Multipart,
    mut upload: ImportUpload,
) -> std::result::Result<ImportUpload, AdminError> {
    while let Some(field) = multipart.next_field().await.map_err(unreadable)? {
        match field.name() {
            Some(CSV_FILE_FIELD) => {
                let bytes = field.bytes().await.map_err(unreadable)?;
                // Browsers send an empty part when no file was chosen.
                if !bytes.is_empty() {
                    upload.csv = Some(bytes.to_vec());
                }
            }
            Some(DELIMITER_FIELD) => upload.delimiter = field.text().await.map_err(unreadable)?,
            Some(CSRF_TOKEN_KEY) => {
                upload.csrf_token = Some(field.text().await.map_err(unreadable)?)
            }
            _ => {}
        }
    }
    Ok(upload)
}

pub async fn import_handler(
    State(state): State<AppState>,
    format: ResponseFormat,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response> {
    let upload = ImportUpload {
        csrf_token: headers
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        ..ImportUpload::default()
    };

    let report = match read_upload(&mut multipart, upload).await {
        Ok(upload) => {
            state.verify_csrf(upload.csrf_token.as_deref())?;
            let creator = state.creator(requested_account(&headers));
            state
                .admin()
                .import(upload.csv.as_deref(), &upload.delimiter, creator.as_deref())
                .await
        }
        Err(error) => {
            warn!(error = %error, "import upload could not be read");
            state.admin().failed_import(&error)
        }
    };
    let messages = report.messages.clone();
    Ok(respond(&state, format, report, messages))
}
