use detour_core::Redirect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of the status code filter when no code is selected.
pub const NO_STATUS_CODE_FILTER: i32 = -1;

/// The filters applied to the full redirect list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Trimmed, lowercased search value; empty matches everything.
    pub search_value: String,
    /// Selected status code, or [`NO_STATUS_CODE_FILTER`].
    pub status_code: i32,
    /// Selected redirect type; empty matches everything.
    pub redirect_type: String,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            search_value: String::new(),
            status_code: NO_STATUS_CODE_FILTER,
            redirect_type: String::new(),
        }
    }
}

impl Filter {
    pub fn normalize_search(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn matches(&self, redirect: &Redirect) -> bool {
        (self.status_code <= 0 || i32::from(redirect.status_code) == self.status_code)
            && (self.redirect_type.is_empty() || redirect.redirect_type.as_str() == self.redirect_type)
            && (self.search_value.is_empty()
                || contains(&redirect.source_uri_path, &self.search_value)
                || contains(&redirect.target_uri_path, &self.search_value)
                || redirect
                    .comment
                    .as_deref()
                    .is_some_and(|comment| contains(comment, &self.search_value)))
    }

    pub fn apply(&self, redirects: &[Redirect]) -> Vec<Redirect> {
        redirects
            .iter()
            .filter(|redirect| self.matches(redirect))
            .cloned()
            .collect()
    }

    pub fn is_active(&self) -> bool {
        !self.search_value.is_empty()
            || self.status_code > 0
            || !self.redirect_type.is_empty()
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Number of redirects per status code and per type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub by_status_code: BTreeMap<u16, usize>,
    pub by_type: BTreeMap<String, usize>,
}

impl Counts {
    pub fn of(redirects: &[Redirect]) -> Self {
        let mut counts = Self::default();
        for redirect in redirects {
            *counts.by_status_code.entry(redirect.status_code).or_default() += 1;
            *counts
                .by_type
                .entry(redirect.redirect_type.as_str().to_string())
                .or_default() += 1;
        }
        counts
    }

    pub fn status_code(&self, status_code: i32) -> usize {
        u16::try_from(status_code)
            .ok()
            .and_then(|code| self.by_status_code.get(&code).copied())
            .unwrap_or_default()
    }

    pub fn redirect_type(&self, redirect_type: &str) -> usize {
        self.by_type.get(redirect_type).copied().unwrap_or_default()
    }
}

/// One entry of a filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption<V> {
    pub value: V,
    pub count: usize,
}
