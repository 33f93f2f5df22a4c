use crate::admin::{is_same, RedirectAdmin};
use crate::error::{AdminError, Result};
use crate::message::FlashMessage;
use crate::request::{CreateRedirectRequest, StatusCodeInput};
use crate::translator::Translator;
use detour_core::{Host, RedirectStorage};
use serde::Serialize;
use tracing::{debug, info};

const DEFAULT_DELIMITER: u8 = b',';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProtocolEntryType {
    Created,
    Updated,
    Unchanged,
    Error,
}

/// What happened to one row of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolEntry {
    #[serde(rename = "type")]
    pub entry_type: ProtocolEntryType,
    /// 1-based line of the row in the uploaded file.
    pub line: u64,
    #[serde(with = "detour_core::host::option")]
    pub host: Option<Host>,
    pub source_uri_path: String,
    pub target_uri_path: String,
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub protocol: Vec<ProtocolEntry>,
    pub messages: Vec<FlashMessage>,
}

impl ImportReport {
    pub fn error_count(&self) -> usize {
        self.protocol
            .iter()
            .filter(|entry| entry.entry_type == ProtocolEntryType::Error)
            .count()
    }
}

/// Parses the delimiter chosen in the upload form.
///
/// Empty input selects `,`; `\t` and `tab` select a tab.
pub fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw {
        "" => Ok(DEFAULT_DELIMITER),
        "\\t" | "\t" | "tab" => Ok(b'\t'),
        other => match other.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(AdminError::ImportFormat(format!("unsupported delimiter '{other}'"))),
        },
    }
}

/// Column positions found in the header row.
struct Columns {
    source_uri_path: usize,
    target_uri_path: usize,
    status_code: Option<usize>,
    host: Option<usize>,
    start_date_time: Option<usize>,
    end_date_time: Option<usize>,
    comment: Option<usize>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|column| column.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| {
                AdminError::ImportFormat(format!("missing required column '{name}'"))
            })
        };

        Ok(Self {
            source_uri_path: required("sourceUriPath")?,
            target_uri_path: required("targetUriPath")?,
            status_code: find("statusCode"),
            host: find("host"),
            start_date_time: find("startDateTime"),
            end_date_time: find("endDateTime"),
            comment: find("comment"),
        })
    }

    fn request(&self, record: &csv::StringRecord) -> CreateRedirectRequest {
        let field = |index: Option<usize>| {
            index
                .and_then(|index| record.get(index))
                .map(str::to_string)
                .filter(|value| !value.is_empty())
        };

        CreateRedirectRequest {
            host: field(self.host),
            source_uri_path: field(Some(self.source_uri_path)).unwrap_or_default(),
            target_uri_path: field(Some(self.target_uri_path)).unwrap_or_default(),
            status_code: field(self.status_code).map(StatusCodeInput::Text),
            start_date_time: field(self.start_date_time),
            end_date_time: field(self.end_date_time),
            comment: field(self.comment),
            force: true,
        }
    }
}

impl<S: RedirectStorage, T: Translator> RedirectAdmin<S, T> {
    /// Imports every row of `content`, overwriting existing redirects.
    ///
    /// Row level problems end up in the protocol. Only a file that cannot be
    /// read as CSV at all fails the whole import.
    pub async fn import_csv(
        &self,
        content: &[u8],
        delimiter: u8,
        creator: Option<&str>,
    ) -> Result<Vec<ProtocolEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(content);

        let header = reader
            .headers()
            .map_err(|e| AdminError::ImportFormat(e.to_string()))?
            .clone();
        if header.iter().all(str::is_empty) {
            return Ok(Vec::new());
        }
        let columns = Columns::from_header(&header)?;

        let mut protocol = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => return Err(AdminError::ImportFormat(e.to_string())),
            }
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            protocol.push(self.import_row(&columns, &record, line, creator).await);
        }

        info!(
            rows = protocol.len(),
            errors = protocol
                .iter()
                .filter(|entry| entry.entry_type == ProtocolEntryType::Error)
                .count(),
            "imported redirects"
        );
        Ok(protocol)
    }

    async fn import_row(
        &self,
        columns: &Columns,
        record: &csv::StringRecord,
        line: u64,
        creator: Option<&str>,
    ) -> ProtocolEntry {
        let request = columns.request(record);
        let mut entry = ProtocolEntry {
            entry_type: ProtocolEntryType::Error,
            line,
            host: Host::normalize(request.host.as_deref()),
            source_uri_path: request.source_uri_path.clone(),
            target_uri_path: request.target_uri_path.clone(),
            status_code: None,
            messages: Vec::new(),
        };

        let command = match request.into_command(self.options().default_status_code) {
            Ok(command) => command,
            Err(errors) => {
                entry.messages = errors
                    .iter()
                    .map(|error| self.error_message(error).title)
                    .collect();
                return entry;
            }
        };
        entry.status_code = Some(command.status_code);
        entry.target_uri_path = command.target_uri_path.clone();

        let existing = match self
            .storage()
            .get_one_by_source_uri_path_and_host(
                &command.source_uri_path,
                command.host.as_ref(),
                true,
            )
            .await
        {
            Ok(existing) => existing,
            Err(error) => {
                entry.messages = vec![self.error_message(&error.into()).title];
                return entry;
            }
        };

        if is_same(
            &command.source_uri_path,
            &command.target_uri_path,
            command.host.as_ref(),
            command.status_code,
            existing.as_ref(),
        ) {
            debug!(line, redirect = %command.identity(), "import row unchanged");
            entry.entry_type = ProtocolEntryType::Unchanged;
            return entry;
        }

        match self.add_redirect(&command, creator, true).await {
            Ok(_) if existing.is_some() => entry.entry_type = ProtocolEntryType::Updated,
            Ok(_) => entry.entry_type = ProtocolEntryType::Created,
            Err(error) => entry.messages = vec![self.error_message(&error).title],
        }
        entry
    }

    /// Runs an import for an uploaded file and summarises it for the user.
    pub async fn import(
        &self,
        upload: Option<&[u8]>,
        delimiter: &str,
        creator: Option<&str>,
    ) -> ImportReport {
        let result = match (upload, parse_delimiter(delimiter)) {
            (None, _) => Err(AdminError::MissingUpload),
            (Some(_), Err(error)) => Err(error),
            (Some(content), Ok(delimiter)) => self.import_csv(content, delimiter, creator).await,
        };

        match result {
            Ok(protocol) => {
                let has_errors = protocol
                    .iter()
                    .any(|entry| entry.entry_type == ProtocolEntryType::Error);
                let message = if protocol.is_empty() {
                    FlashMessage::ok(self.translate("error.importCsvEmpty", &[]))
                } else if has_errors {
                    FlashMessage::warning(self.translate("message.importCsvSuccessWithErrors", &[]))
                } else {
                    FlashMessage::ok(self.translate("message.importCsvSuccess", &[]))
                };
                ImportReport {
                    success: !protocol.is_empty(),
                    protocol,
                    messages: vec![message],
                }
            }
            Err(error) => self.failed_import(&error),
        }
    }

    /// Reports an import that never got to read any rows, e.g. because the
    /// upload itself could not be read.
    pub fn failed_import(&self, error: &AdminError) -> ImportReport {
        ImportReport {
            success: false,
            protocol: Vec::new(),
            messages: vec![self.error_message(error)],
        }
    }
}
