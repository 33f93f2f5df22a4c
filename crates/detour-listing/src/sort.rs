use detour_core::Redirect;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A sortable column of the redirect list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    StatusCode,
    Host,
    #[default]
    SourceUriPath,
    TargetUriPath,
    StartDateTime,
    EndDateTime,
    Comment,
    HitCounter,
    CreationDateTime,
    Creator,
    #[serde(rename = "type")]
    Type,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Comparable value of a redirect in one column.
///
/// Absent values sort before everything else; text is compared lowercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Empty,
    Number(i64),
    Text(String),
}

impl SortKey {
    fn text(value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => SortKey::Text(value.to_lowercase()),
            _ => SortKey::Empty,
        }
    }

    fn time(value: Option<jiff::Timestamp>) -> Self {
        value
            .map(|ts| SortKey::Number(ts.as_millisecond()))
            .unwrap_or(SortKey::Empty)
    }
}

pub fn sort_key(redirect: &Redirect, column: SortColumn) -> SortKey {
    match column {
        SortColumn::StatusCode => SortKey::Number(i64::from(redirect.status_code)),
        SortColumn::Host => SortKey::text(redirect.host.as_ref().map(|host| host.as_str())),
        SortColumn::SourceUriPath => SortKey::text(Some(&redirect.source_uri_path)),
        SortColumn::TargetUriPath => SortKey::text(Some(&redirect.target_uri_path)),
        SortColumn::StartDateTime => SortKey::time(redirect.start_date_time),
        SortColumn::EndDateTime => SortKey::time(redirect.end_date_time),
        SortColumn::Comment => SortKey::text(redirect.comment.as_deref()),
        SortColumn::HitCounter => {
            SortKey::Number(i64::try_from(redirect.hit_counter).unwrap_or(i64::MAX))
        }
        SortColumn::CreationDateTime => SortKey::time(Some(redirect.creation_date_time)),
        SortColumn::Creator => SortKey::text(redirect.creator.as_deref()),
        SortColumn::Type => SortKey::text(Some(redirect.redirect_type.as_str())),
    }
}

/// Sorts ascending by `column`, then reverses for descending order.
pub fn sort_redirects(redirects: &mut [Redirect], column: SortColumn, direction: SortDirection) {
    redirects.sort_by(|a, b| compare(a, b, column));
    if direction == SortDirection::Desc {
        redirects.reverse();
    }
}

fn compare(a: &Redirect, b: &Redirect, column: SortColumn) -> Ordering {
    sort_key(a, column).cmp(&sort_key(b, column))
}
