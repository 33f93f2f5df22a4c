use crate::filter::NO_STATUS_CODE_FILTER;
use detour_core::Redirect;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Endpoints the list talks to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actions {
    pub create: String,
    pub update: String,
    pub delete: String,
    #[serde(default)]
    pub bulk_delete: String,
    #[serde(default)]
    pub export: String,
    #[serde(default)]
    pub import: String,
}

fn no_status_code_filter() -> i32 {
    NO_STATUS_CODE_FILTER
}

/// Everything the server hands to the list when the page loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
    pub redirects: Vec<Redirect>,
    pub actions: Actions,
    pub status_codes: BTreeMap<String, String>,
    #[serde(default)]
    pub host_options: Vec<String>,
    #[serde(default)]
    pub csrf_token: String,
    pub valid_source_uri_path_pattern: String,
    pub default_status_code: u16,
    #[serde(default = "no_status_code_filter")]
    pub initial_status_code_filter: i32,
    #[serde(default)]
    pub initial_type_filter: String,
    #[serde(default)]
    pub show_hit_count: bool,
}

/// Known hosts merged with the hosts used by `redirects`, sorted and unique.
pub fn host_options<'a>(
    configured: impl IntoIterator<Item = &'a str>,
    redirects: &'a [Redirect],
) -> Vec<String> {
    configured
        .into_iter()
        .map(str::trim)
        .chain(
            redirects
                .iter()
                .filter_map(|redirect| redirect.host.as_ref().map(|host| host.as_str())),
        )
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
