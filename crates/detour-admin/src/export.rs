use crate::admin::RedirectAdmin;
use crate::error::{AdminError, Result};
use crate::translator::Translator;
use detour_core::datetime::format_w3c;
use detour_core::host::display_host;
use detour_core::{Host, Redirect, RedirectStorage};
use jiff::Timestamp;
use tracing::info;
use typed_builder::TypedBuilder;

/// Column order of exported files; imports accept the same names.
pub const CSV_COLUMNS: [&str; 10] = [
    "sourceUriPath",
    "targetUriPath",
    "statusCode",
    "host",
    "startDateTime",
    "endDateTime",
    "comment",
    "type",
    "creator",
    "hitCounter",
];

#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct ExportOptions {
    /// Also export redirects outside their activity window.
    #[builder(default)]
    pub include_inactive: bool,
    /// Also export redirects that were not created manually.
    #[builder(default)]
    pub include_generated: bool,
    /// Only export redirects scoped to this host.
    #[builder(default)]
    pub host: Option<Host>,
}

impl ExportOptions {
    fn accepts(&self, redirect: &Redirect, now: Timestamp) -> bool {
        (self.include_inactive || redirect.is_active_at(now))
            && (self.include_generated || redirect.redirect_type.is_manual())
    }
}

/// Name of the download, e.g. `redirects-2024-03-01-10-30-00.csv`.
pub fn export_filename(now: Timestamp) -> String {
    format!("redirects-{}.csv", now.strftime("%Y-%m-%d-%H-%M-%S"))
}

/// Serialises `redirects` as CSV with a header row.
pub fn write_csv(redirects: &[Redirect]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_COLUMNS)
        .map_err(|e| AdminError::Export(e.to_string()))?;

    for redirect in redirects {
        wtr.write_record([
            redirect.source_uri_path.as_str(),
            redirect.target_uri_path.as_str(),
            &redirect.status_code.to_string(),
            display_host(redirect.host.as_ref()),
            &redirect.start_date_time.map(format_w3c).unwrap_or_default(),
            &redirect.end_date_time.map(format_w3c).unwrap_or_default(),
            redirect.comment.as_deref().unwrap_or(""),
            redirect.redirect_type.as_str(),
            redirect.creator.as_deref().unwrap_or(""),
            &redirect.hit_counter.to_string(),
        ])
        .map_err(|e| AdminError::Export(e.to_string()))?;
    }

    wtr.into_inner()
        .map_err(|e| AdminError::Export(e.to_string()))
}

impl<S: RedirectStorage, T: Translator> RedirectAdmin<S, T> {
    /// Exports the stored redirects selected by `options` as CSV.
    pub async fn export_csv(&self, options: &ExportOptions) -> Result<Vec<u8>> {
        let now = Timestamp::now();
        let redirects: Vec<Redirect> = self
            .storage()
            .get_all(options.host.as_ref())
            .await?
            .into_iter()
            .filter(|redirect| options.accepts(redirect, now))
            .collect();

        let csv = write_csv(&redirects)?;
        info!(count = redirects.len(), bytes = csv.len(), "exported redirects");
        Ok(csv)
    }
}
