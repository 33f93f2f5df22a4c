mod arguments;
mod format;

pub use arguments::{Arguments, ModuleArguments, CSRF_HEADER, CSRF_TOKEN_KEY, MODULE_ARGUMENTS_KEY};
pub use format::ResponseFormat;

use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Query of `GET /redirects/export.csv`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    #[serde(default)]
    pub include_inactive_redirects: Option<String>,
    #[serde(default)]
    pub include_generated_redirects: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

/// Query parameter carrying the flash message ticket of a redirect.
pub const FLASH_QUERY: &str = "flash";

/// Query of the list endpoints, preselecting filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub flash: Option<u64>,
    /// Search value the rendered page starts with.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status_code: Option<i32>,
    #[serde(default, rename = "type")]
    pub redirect_type: Option<String>,
}

/// Reads a checkbox style flag: `1`, `true` and `on` are set.
pub fn is_checked(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        )
    })
}
