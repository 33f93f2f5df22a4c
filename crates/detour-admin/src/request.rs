//! Request payloads of the admin actions and their validated commands.

use crate::error::{AdminError, DateField, ValidationError};
use detour_core::datetime::parse_optional_date_time;
use detour_core::status::{parse_status_code, status_code_supports_target, PLACEHOLDER_TARGET};
use detour_core::{Host, RedirectIdentity};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A status code as sent by forms (string) or API clients (number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusCodeInput {
    Number(u16),
    Text(String),
}

impl StatusCodeInput {
    fn resolve(&self, default: u16) -> Result<u16, ValidationError> {
        match self {
            StatusCodeInput::Number(code) => parse_status_code(&code.to_string()),
            StatusCodeInput::Text(raw) if raw.trim().is_empty() => Ok(default),
            StatusCodeInput::Text(raw) => parse_status_code(raw),
        }
        .map_err(|_| ValidationError::InvalidStatusCode(self.to_string()))
    }
}

impl std::fmt::Display for StatusCodeInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusCodeInput::Number(code) => write!(f, "{code}"),
            StatusCodeInput::Text(raw) => f.write_str(raw),
        }
    }
}

impl From<u16> for StatusCodeInput {
    fn from(value: u16) -> Self {
        StatusCodeInput::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedirectRequest {
    #[serde(default)]
    pub host: Option<String>,
    pub source_uri_path: String,
    #[serde(default)]
    pub target_uri_path: String,
    #[serde(default)]
    pub status_code: Option<StatusCodeInput>,
    #[serde(default)]
    pub start_date_time: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRedirectRequest {
    pub original_source_uri_path: String,
    #[serde(default)]
    pub original_host: Option<String>,
    #[serde(flatten)]
    pub redirect: CreateRedirectRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRedirectRequest {
    pub source_uri_path: String,
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub redirects: Vec<DeleteRedirectRequest>,
}

/// A redirect as requested by the user, with every field parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectCommand {
    pub source_uri_path: String,
    pub target_uri_path: String,
    pub status_code: u16,
    pub host: Option<Host>,
    pub comment: Option<String>,
    pub start_date_time: Option<Timestamp>,
    pub end_date_time: Option<Timestamp>,
}

impl RedirectCommand {
    pub fn identity(&self) -> RedirectIdentity {
        RedirectIdentity::new(self.source_uri_path.clone(), self.host.clone())
    }
}

impl CreateRedirectRequest {
    /// Parses the request into a command.
    ///
    /// Collects every field problem instead of stopping at the first one, so
    /// the user sees an invalid start and end date in a single round trip.
    /// Status codes without a target get the placeholder target `/`.
    pub fn into_command(self, default_status_code: u16) -> Result<RedirectCommand, Vec<AdminError>> {
        let mut errors: Vec<AdminError> = Vec::new();

        let status_code = match &self.status_code {
            None => default_status_code,
            Some(input) => input.resolve(default_status_code).unwrap_or_else(|error| {
                errors.push(error.into());
                default_status_code
            }),
        };

        let start_date_time = parse_date(DateField::Start, self.start_date_time.as_deref())
            .unwrap_or_else(|error| {
                errors.push(error);
                None
            });
        let end_date_time = parse_date(DateField::End, self.end_date_time.as_deref())
            .unwrap_or_else(|error| {
                errors.push(error);
                None
            });

        let source_uri_path = self.source_uri_path.trim().to_string();
        if source_uri_path.is_empty() {
            errors.push(ValidationError::EmptySourceUriPath.into());
        }

        let mut target_uri_path = self.target_uri_path.trim().to_string();
        if target_uri_path.is_empty() {
            if status_code_supports_target(status_code) {
                errors.push(ValidationError::MissingTargetUriPath(status_code).into());
            } else {
                target_uri_path = PLACEHOLDER_TARGET.to_string();
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RedirectCommand {
            source_uri_path,
            target_uri_path,
            status_code,
            host: Host::normalize(self.host.as_deref()),
            comment: self
                .comment
                .map(|comment| comment.trim().to_string())
                .filter(|comment| !comment.is_empty()),
            start_date_time,
            end_date_time,
        })
    }
}

impl UpdateRedirectRequest {
    pub fn original_identity(&self) -> RedirectIdentity {
        RedirectIdentity::new(
            self.original_source_uri_path.trim(),
            Host::normalize(self.original_host.as_deref()),
        )
    }
}

impl DeleteRedirectRequest {
    pub fn identity(&self) -> RedirectIdentity {
        RedirectIdentity::new(
            self.source_uri_path.trim(),
            Host::normalize(self.host.as_deref()),
        )
    }
}

fn parse_date(field: DateField, raw: Option<&str>) -> Result<Option<Timestamp>, AdminError> {
    parse_optional_date_time(raw).map_err(|_| AdminError::InvalidDate {
        field,
        value: raw.unwrap_or_default().to_string(),
    })
}
