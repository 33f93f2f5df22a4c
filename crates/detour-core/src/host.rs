use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// Wildcard accepted from forms as "any host".
const WILDCARD: &str = "*";

/// A host name a redirect is scoped to.
///
/// A redirect without a host applies to every host. That case is always
/// expressed as `Option::<Host>::None`; a `Host` is never empty, so an empty
/// string, whitespace, or the `*` wildcard cannot sneak in as a distinct key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Host(SmolStr);

impl Host {
    /// Parses a raw host value.
    ///
    /// Returns `None` for empty, whitespace-only and wildcard values.
    ///
    /// # Examples
    ///
    /// ```
    /// use detour_core::Host;
    ///
    /// assert_eq!(Host::parse(" example.com ").unwrap().as_str(), "example.com");
    /// assert!(Host::parse("").is_none());
    /// assert!(Host::parse("*").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == WILDCARD {
            return None;
        }
        Some(Self(SmolStr::new(trimmed)))
    }

    /// Canonicalises an optional raw host.
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::parse)
    }

    /// Returns the host as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Host").field(&self.0).finish()
    }
}

impl Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Host {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Displays an optional host, rendering "all hosts" as an empty string.
pub fn display_host(host: Option<&Host>) -> &str {
    host.map(Host::as_str).unwrap_or_default()
}

/// Serde adapter for `Option<Host>` fields.
///
/// Serialises `None` as `null` and accepts `null`, a missing field, an empty
/// string or `*` as "all hosts" when deserialising.
pub mod option {
    use super::Host;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(host: &Option<Host>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        host.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Host>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Host::normalize(raw.as_deref()))
    }
}

impl<'de> Deserialize<'de> for Host {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = SmolStr::deserialize(deserializer)?;
        Host::parse(&raw).ok_or_else(|| serde::de::Error::custom("host must not be empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Scoped {
        #[serde(default, with = "option")]
        host: Option<Host>,
    }

    #[test]
    fn blank_and_wildcard_mean_all_hosts() {
        assert!(Host::parse("").is_none());
        assert!(Host::parse("   ").is_none());
        assert!(Host::parse(" * ").is_none());
        assert!(Host::normalize(None).is_none());
    }

    #[test]
    fn parse_trims() {
        let host = Host::parse("  neos.io\t").unwrap();
        assert_eq!(host.as_str(), "neos.io");
        assert_eq!(Host::parse("neos.io"), Some(host));
    }

    #[test]
    fn option_adapter_normalizes_empty_strings() {
        let scoped: Scoped = serde_json::from_str(r#"{"host":""}"#).unwrap();
        assert!(scoped.host.is_none());

        let scoped: Scoped = serde_json::from_str(r#"{}"#).unwrap();
        assert!(scoped.host.is_none());

        let scoped: Scoped = serde_json::from_str(r#"{"host":"a.com"}"#).unwrap();
        assert_eq!(scoped.host.unwrap().as_str(), "a.com");
    }

    #[test]
    fn option_adapter_serializes_none_as_null() {
        let json = serde_json::to_string(&Scoped { host: None }).unwrap();
        assert_eq!(json, r#"{"host":null}"#);
    }

    #[test]
    fn display_host_renders_empty_for_all_hosts() {
        assert_eq!(display_host(None), "");
        assert_eq!(display_host(Host::parse("a.com").as_ref()), "a.com");
    }
}
