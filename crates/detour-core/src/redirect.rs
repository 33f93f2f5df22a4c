use crate::host::{self, Host};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use typed_builder::TypedBuilder;

const TYPE_MANUAL: &str = "manual";
const TYPE_GENERATED: &str = "generated";

/// How a redirect came into existence.
///
/// Only manual redirects are created through the admin module; generated
/// ones come from imports or from the host system and are read-only here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RedirectType {
    #[default]
    Manual,
    Generated,
    Other(String),
}

impl RedirectType {
    pub fn as_str(&self) -> &str {
        match self {
            RedirectType::Manual => TYPE_MANUAL,
            RedirectType::Generated => TYPE_GENERATED,
            RedirectType::Other(other) => other,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, RedirectType::Manual)
    }
}

impl From<String> for RedirectType {
    fn from(value: String) -> Self {
        match value.as_str() {
            TYPE_MANUAL => RedirectType::Manual,
            TYPE_GENERATED => RedirectType::Generated,
            _ => RedirectType::Other(value),
        }
    }
}

impl From<&str> for RedirectType {
    fn from(value: &str) -> Self {
        RedirectType::from(value.to_string())
    }
}

impl From<RedirectType> for String {
    fn from(value: RedirectType) -> Self {
        match value {
            RedirectType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for RedirectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(host, sourceUriPath)` pair that is unique across all redirects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectIdentity {
    #[serde(default, with = "host::option")]
    pub host: Option<Host>,
    pub source_uri_path: String,
}

impl RedirectIdentity {
    pub fn new(source_uri_path: impl Into<String>, host: Option<Host>) -> Self {
        Self {
            host,
            source_uri_path: source_uri_path.into(),
        }
    }
}

impl Display for RedirectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}",
            host::display_host(self.host.as_ref()),
            self.source_uri_path.trim_start_matches('/')
        )
    }
}

/// A stored redirect rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    /// Host the redirect is scoped to; `None` applies to all hosts.
    #[serde(default, with = "host::option")]
    #[builder(default)]
    pub host: Option<Host>,
    #[builder(setter(into))]
    pub source_uri_path: String,
    #[builder(setter(into))]
    pub target_uri_path: String,
    pub status_code: u16,
    #[serde(default)]
    #[builder(default)]
    pub start_date_time: Option<Timestamp>,
    #[serde(default)]
    #[builder(default)]
    pub end_date_time: Option<Timestamp>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub comment: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub creator: Option<String>,
    #[serde(rename = "type", default)]
    #[builder(default)]
    pub redirect_type: RedirectType,
    #[serde(default)]
    #[builder(default)]
    pub hit_counter: u64,
    #[serde(default)]
    #[builder(default)]
    pub last_hit: Option<Timestamp>,
    #[builder(default = Timestamp::now())]
    pub creation_date_time: Timestamp,
}

impl Redirect {
    pub fn identity(&self) -> RedirectIdentity {
        RedirectIdentity::new(self.source_uri_path.clone(), self.host.clone())
    }

    /// Returns true if this redirect occupies the given identity.
    pub fn has_identity(&self, source_uri_path: &str, host: Option<&Host>) -> bool {
        self.source_uri_path == source_uri_path && self.host.as_ref() == host
    }

    /// Returns true if `now` falls inside the optional start/end window.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.start_date_time.is_none_or(|start| start <= now)
            && self.end_date_time.is_none_or(|end| end >= now)
    }
}

/// Everything a store needs to create one redirect per host.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct NewRedirect {
    #[builder(setter(into))]
    pub source_uri_path: String,
    #[builder(setter(into))]
    pub target_uri_path: String,
    pub status_code: u16,
    /// One redirect is created per entry; `None` stands for all hosts.
    #[builder(default = vec![None])]
    pub hosts: Vec<Option<Host>>,
    #[builder(default)]
    pub creator: Option<String>,
    #[builder(default)]
    pub comment: Option<String>,
    #[builder(default)]
    pub redirect_type: RedirectType,
    #[builder(default)]
    pub start_date_time: Option<Timestamp>,
    #[builder(default)]
    pub end_date_time: Option<Timestamp>,
}

impl NewRedirect {
    /// Materialises the redirect for one host at creation time `now`.
    pub fn to_redirect(&self, host: Option<Host>, now: Timestamp) -> Redirect {
        Redirect {
            host,
            source_uri_path: self.source_uri_path.clone(),
            target_uri_path: self.target_uri_path.clone(),
            status_code: self.status_code,
            start_date_time: self.start_date_time,
            end_date_time: self.end_date_time,
            comment: self.comment.clone(),
            creator: self.creator.clone(),
            redirect_type: self.redirect_type.clone(),
            hit_counter: 0,
            last_hit: None,
            creation_date_time: now,
        }
    }
}
