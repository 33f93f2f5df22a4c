use detour_core::status::DEFAULT_STATUS_CODE;
use regex::Regex;
use std::sync::LazyLock;
use typed_builder::TypedBuilder;

/// Characters accepted in a source uri path unless configured otherwise.
pub const DEFAULT_SOURCE_URI_PATH_PATTERN: &str = r"^[a-zA-Z0-9_\-/.%]+$";

static DEFAULT_SOURCE_URI_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_SOURCE_URI_PATH_PATTERN).expect("default source uri path pattern is valid")
});

/// Rules applied to every redirect before it is written.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ValidationOptions {
    #[builder(default = DEFAULT_SOURCE_URI_PATH.clone())]
    pub source_uri_path: Regex,
    #[builder(default = DEFAULT_STATUS_CODE)]
    pub default_status_code: u16,
}

impl ValidationOptions {
    /// Options using `pattern` for source uri paths.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::builder().source_uri_path(Regex::new(pattern)?).build())
    }

    /// The configured pattern as written, used in messages and the UI.
    pub fn source_uri_path_pattern(&self) -> &str {
        self.source_uri_path.as_str()
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}
