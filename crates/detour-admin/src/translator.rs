use std::collections::HashMap;

/// Resolves message ids to user facing labels.
///
/// Arguments are substituted into positional `{0}`, `{1}`, ... placeholders.
pub trait Translator: Send + Sync + 'static {
    /// Returns the translated label, or `None` if the id is unknown.
    fn translate_by_id(&self, id: &str, arguments: &[String]) -> Option<String>;

    /// Like [`Translator::translate_by_id`], falling back to the raw id.
    fn translate_or_id(&self, id: &str, arguments: &[String]) -> String {
        self.translate_by_id(id, arguments)
            .unwrap_or_else(|| id.to_string())
    }
}

impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    fn translate_by_id(&self, id: &str, arguments: &[String]) -> Option<String> {
        (**self).translate_by_id(id, arguments)
    }
}

const ENGLISH: &[(&str, &str)] = &[
    ("message.redirectCreated", "Redirect created: {0}/{1} → {2} ({3})"),
    (
        "warning.redirectCreatedWithChanges",
        "Redirect created: {0}/{1} → {2} ({3}), other redirects were changed",
    ),
    ("error.redirectNotCreated", "The redirect could not be created"),
    ("message.redirectUpdated", "Redirect updated: {0}/{1} → {2} ({3})"),
    (
        "warning.redirectUpdatedWithChanges",
        "Redirect updated: {0}/{1} → {2} ({3}), other redirects were changed",
    ),
    ("error.redirectNotUpdated", "The redirect could not be updated"),
    ("error.redirectNotValid", "The redirect is not valid"),
    ("message.redirectDeleted", "Redirect deleted: {0}/{1}"),
    ("error.redirectNotDeleted", "The redirect could not be deleted"),
    ("message.redirectsDeleted", "{0} redirects deleted"),
    (
        "warning.redirectsPartiallyDeleted",
        "{0} of {1} redirects deleted, some could not be deleted",
    ),
    ("error.redirectsNotDeleted", "No redirect could be deleted"),
    ("message.relatedChanges", "The following redirects were changed as well:"),
    ("error.redirectExists", "A redirect for {0} already exists"),
    ("error.redirectDiffers", "A different redirect for {0} already exists"),
    ("error.redirectNotFound", "There is no redirect for {0}"),
    ("error.sameSourceAndTarget", "Source and target path must differ"),
    (
        "error.sourceUriPathNotValid",
        "The source path contains invalid characters, it has to match {0}",
    ),
    ("error.sourceUriPathEmpty", "The source path must not be empty"),
    ("error.targetUriPathRequired", "Status code {0} requires a target path"),
    ("error.invalidStatusCode", "\"{0}\" is not a valid status code"),
    ("error.invalidStartDateTime", "The start date is not valid"),
    ("error.invalidEndDateTime", "The end date is not valid"),
    ("error.storageFailed", "The redirect storage failed: {0}"),
    ("error.csvFileNotSet", "Please choose a CSV file to import"),
    ("error.importCsvEmpty", "The CSV file did not contain any redirects"),
    ("error.importCsvFailed", "The CSV file could not be read: {0}"),
    ("error.importResourceFailed", "The uploaded file could not be accessed: {0}"),
    ("error.exportCsvFailed", "The CSV file could not be written: {0}"),
    ("message.importCsvSuccess", "All redirects were imported"),
    (
        "message.importCsvSuccessWithErrors",
        "The import finished, but some rows could not be imported",
    ),
    ("message.redirectUnchanged", "An identical redirect already exists"),
];

/// A flat id → label catalog with built-in English labels.
#[derive(Debug, Clone)]
pub struct Catalog {
    labels: HashMap<String, String>,
}

impl Catalog {
    /// Catalog containing the shipped English labels.
    pub fn english() -> Self {
        Self {
            labels: ENGLISH
                .iter()
                .map(|(id, label)| (id.to_string(), label.to_string()))
                .collect(),
        }
    }

    /// Catalog without any labels; every lookup falls back to the id.
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Overlays labels from a JSON object of `id → label`.
    pub fn merge_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let overrides: HashMap<String, String> = serde_json::from_str(json)?;
        self.labels.extend(overrides);
        Ok(())
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(id.into(), label.into());
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::english()
    }
}

impl Translator for Catalog {
    fn translate_by_id(&self, id: &str, arguments: &[String]) -> Option<String> {
        self.labels
            .get(id)
            .map(|label| substitute(label, arguments))
    }
}

fn substitute(label: &str, arguments: &[String]) -> String {
    arguments
        .iter()
        .enumerate()
        .fold(label.to_string(), |label, (index, argument)| {
            label.replace(&format!("{{{index}}}"), argument)
        })
}
