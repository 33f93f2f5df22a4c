use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Severity of a [`FlashMessage`], serialised the way the list UI expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Notice,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user facing notification produced by an admin action.
///
/// `title` carries the translated headline; `message` holds an optional body,
/// which may contain a small HTML list of related changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub severity: Severity,
}

impl FlashMessage {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn ok(title: impl Into<String>) -> Self {
        Self::new(Severity::Ok, title, "")
    }

    pub fn notice(title: impl Into<String>) -> Self {
        Self::new(Severity::Notice, title, "")
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, "")
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, "")
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_uppercase_on_the_wire() {
        let message = FlashMessage::warning("Careful").with_message("<p>body</p>");
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["severity"], "WARNING");
        assert_eq!(json["title"], "Careful");
        assert_eq!(json["message"], "<p>body</p>");
    }

    #[test]
    fn message_body_is_optional() {
        let message: FlashMessage =
            serde_json::from_str(r#"{"title":"Saved","severity":"OK"}"#).unwrap();
        assert_eq!(message, FlashMessage::ok("Saved"));
        assert!(!message.is_error());
    }
}
