//! State of the create/edit form and the payload it submits.

use detour_core::datetime::{format_readable, format_w3c, parse_date_time};
use detour_core::host::display_host;
use detour_core::status::{status_code_supports_target, PLACEHOLDER_TARGET};
use detour_core::{Redirect, RedirectIdentity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const UNSET_STATUS_CODE: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("source and target path are the same")]
    SameSourceAndTarget,
    #[error("invalid start date time: {0}")]
    InvalidStartDateTime(String),
    #[error("invalid end date time: {0}")]
    InvalidEndDateTime(String),
}

impl FormError {
    pub fn message_id(&self) -> &'static str {
        match self {
            FormError::SameSourceAndTarget => "error.sameSourceAndTarget",
            FormError::InvalidStartDateTime(_) => "error.invalidStartDateTime",
            FormError::InvalidEndDateTime(_) => "error.invalidEndDateTime",
        }
    }
}

/// Field values of the redirect form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub host: String,
    pub source_uri_path: String,
    pub target_uri_path: String,
    /// `-1` until the user picks a code.
    pub status_code: i32,
    pub start_date_time: String,
    pub end_date_time: String,
    pub comment: String,
    /// The redirect being edited, `None` when creating.
    #[serde(skip)]
    pub original: Option<RedirectIdentity>,
    #[serde(skip)]
    is_sending: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            host: String::new(),
            source_uri_path: String::new(),
            target_uri_path: String::new(),
            status_code: UNSET_STATUS_CODE,
            start_date_time: String::new(),
            end_date_time: String::new(),
            comment: String::new(),
            original: None,
            is_sending: false,
        }
    }
}

/// The JSON body posted to the create and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    #[serde(rename = "__csrfToken")]
    pub csrf_token: String,
    #[serde(rename = "moduleArguments")]
    pub module_arguments: SubmissionArguments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionArguments {
    pub original_host: Option<String>,
    pub original_source_uri_path: Option<String>,
    pub host: String,
    pub source_uri_path: String,
    pub target_uri_path: String,
    pub status_code: u16,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub comment: String,
}

impl FormState {
    /// An empty form for a new redirect.
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled with `redirect` for editing.
    pub fn edit(redirect: &Redirect) -> Self {
        Self {
            host: display_host(redirect.host.as_ref()).to_string(),
            source_uri_path: redirect.source_uri_path.clone(),
            target_uri_path: redirect.target_uri_path.clone(),
            status_code: i32::from(redirect.status_code),
            start_date_time: redirect.start_date_time.map(format_readable).unwrap_or_default(),
            end_date_time: redirect.end_date_time.map(format_readable).unwrap_or_default(),
            comment: redirect.comment.clone().unwrap_or_default(),
            original: Some(redirect.identity()),
            is_sending: false,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    /// Marks the form as in flight. Returns false if it already is.
    pub fn begin_submit(&mut self) -> bool {
        if self.is_sending {
            return false;
        }
        self.is_sending = true;
        true
    }

    /// Ends a submission. A successful create clears the form but keeps the
    /// chosen status code.
    pub fn finish_submit(&mut self, success: bool) {
        if success && self.original.is_none() {
            *self = Self {
                status_code: self.status_code,
                ..Self::default()
            };
        }
        self.is_sending = false;
    }

    /// Checks the form and builds the request body.
    ///
    /// `current_host` is the host the admin UI is served from; source and
    /// target are only compared when the redirect applies to that host.
    pub fn submission(
        &self,
        csrf_token: &str,
        default_status_code: u16,
        current_host: Option<&str>,
    ) -> Result<FormSubmission, FormError> {
        let status_code = u16::try_from(self.status_code)
            .ok()
            .filter(|code| *code > 0)
            .unwrap_or(default_status_code);

        let host = match self.host.trim() {
            "*" => String::new(),
            other => other.to_string(),
        };

        if (host.is_empty() || current_host == Some(host.as_str()))
            && path_of(&self.source_uri_path) == path_of(&self.target_uri_path)
        {
            return Err(FormError::SameSourceAndTarget);
        }

        let start_date_time = w3c(&self.start_date_time)
            .map_err(|_| FormError::InvalidStartDateTime(self.start_date_time.clone()))?;
        let end_date_time = w3c(&self.end_date_time)
            .map_err(|_| FormError::InvalidEndDateTime(self.end_date_time.clone()))?;

        Ok(FormSubmission {
            csrf_token: csrf_token.to_string(),
            module_arguments: SubmissionArguments {
                original_host: self
                    .original
                    .as_ref()
                    .map(|original| display_host(original.host.as_ref()).to_string()),
                original_source_uri_path: self
                    .original
                    .as_ref()
                    .map(|original| original.source_uri_path.clone()),
                host,
                source_uri_path: self.source_uri_path.clone(),
                target_uri_path: if status_code_supports_target(status_code) {
                    self.target_uri_path.clone()
                } else {
                    PLACEHOLDER_TARGET.to_string()
                },
                status_code,
                start_date_time,
                end_date_time,
                comment: self.comment.clone(),
            },
        })
    }
}

/// The path part of a source or target, without query, fragment or
/// leading slashes.
fn path_of(raw: &str) -> &str {
    let raw = raw.trim();
    let without_origin = match raw.find("://") {
        Some(scheme_end) => {
            let rest = &raw[scheme_end + 3..];
            rest.find('/').map_or("", |path_start| &rest[path_start..])
        }
        None => raw,
    };
    let end = without_origin
        .find(['?', '#'])
        .unwrap_or(without_origin.len());
    without_origin[..end].trim_start_matches('/')
}

fn w3c(raw: &str) -> Result<Option<String>, detour_core::CoreError> {
    Ok(parse_date_time(raw)?.map(format_w3c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use detour_core::Host;

    fn form(source: &str, target: &str) -> FormState {
        FormState {
            source_uri_path: source.to_string(),
            target_uri_path: target.to_string(),
            ..FormState::new()
        }
    }

    #[test]
    fn same_path_is_rejected_for_the_current_host() {
        assert_eq!(
            form("/a", "a").submission("t", 301, None),
            Err(FormError::SameSourceAndTarget)
        );
        assert_eq!(
            form("a", "https://example.com/a?x=1").submission("t", 301, None),
            Err(FormError::SameSourceAndTarget)
        );

        let other_host = FormState {
            host: "other.com".to_string(),
            ..form("a", "a")
        };
        assert!(other_host.submission("t", 301, Some("admin.com")).is_ok());
    }

    #[test]
    fn submission_fills_defaults() {
        let submission = FormState {
            host: "*".to_string(),
            start_date_time: "2024-03-01 10:30".to_string(),
            ..form("old", "new")
        }
        .submission("token", 302, None)
        .unwrap();

        assert_eq!(submission.csrf_token, "token");
        let arguments = submission.module_arguments;
        assert_eq!(arguments.status_code, 302);
        assert_eq!(arguments.host, "");
        assert_eq!(arguments.original_source_uri_path, None);
        assert_eq!(
            arguments.start_date_time.as_deref(),
            Some("2024-03-01T10:30:00+00:00")
        );
        assert_eq!(arguments.end_date_time, None);
    }

    #[test]
    fn codes_without_target_send_placeholder() {
        let submission = FormState {
            status_code: 410,
            ..form("gone", "ignored")
        }
        .submission("t", 301, None)
        .unwrap();
        assert_eq!(submission.module_arguments.target_uri_path, "/");
    }

    #[test]
    fn invalid_dates_are_reported() {
        let error = FormState {
            end_date_time: "soon".to_string(),
            ..form("a", "b")
        }
        .submission("t", 301, None)
        .unwrap_err();
        assert_eq!(error.message_id(), "error.invalidEndDateTime");
    }

    #[test]
    fn only_one_submission_in_flight() {
        let mut form = form("a", "b");
        assert!(form.begin_submit());
        assert!(!form.begin_submit());
        form.finish_submit(false);
        assert!(!form.is_sending());
        assert_eq!(form.source_uri_path, "a");
    }

    #[test]
    fn successful_create_resets_but_keeps_status_code() {
        let mut form = FormState {
            status_code: 307,
            ..form("a", "b")
        };
        form.begin_submit();
        form.finish_submit(true);
        assert_eq!(form.status_code, 307);
        assert!(form.source_uri_path.is_empty());
    }

    #[test]
    fn editing_prefills_and_references_the_original() {
        let redirect = Redirect::builder()
            .host(Host::parse("a.com"))
            .source_uri_path("old")
            .target_uri_path("new")
            .status_code(302)
            .build();
        let mut form = FormState::edit(&redirect);
        assert_eq!(form.host, "a.com");
        assert_eq!(form.status_code, 302);

        let submission = form.submission("t", 301, None).unwrap();
        assert_eq!(submission.module_arguments.original_host.as_deref(), Some("a.com"));
        assert_eq!(
            submission.module_arguments.original_source_uri_path.as_deref(),
            Some("old")
        );

        form.begin_submit();
        form.finish_submit(true);
        assert_eq!(form.source_uri_path, "old");
    }
}
