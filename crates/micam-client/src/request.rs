//! Config.cgi request construction

use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocol action keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Get,
    Set,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Set => "set",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single get/set request against a device property
///
/// Only lives long enough to render the request URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub action: Action,
    pub property: String,
    pub value: Option<String>,
}

impl RequestSpec {
    /// Read a property
    pub fn get(property: impl Into<String>) -> Self {
        Self {
            action: Action::Get,
            property: property.into(),
            value: None,
        }
    }

    /// Write a property
    pub fn set(property: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            action: Action::Set,
            property: property.into(),
            value: Some(value.to_string()),
        }
    }

    /// Render the request URI relative to `base_uri`
    ///
    /// The query is assembled literally; neither the property nor the value
    /// is encoded here. The HTTP transport still parses the result as a URL,
    /// so spaces are escaped on the wire and a `#` starts a fragment that is
    /// never sent.
    pub fn to_uri(&self, base_uri: &str) -> String {
        let mut uri = format!(
            "{}?action={}&property={}",
            base_uri, self.action, self.property
        );
        if let Some(value) = &self.value {
            uri.push_str("&value=");
            uri.push_str(value);
        }
        uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://192.72.1.1/cgi-bin/Config.cgi";

    #[test]
    fn test_get_uri() {
        let uri = RequestSpec::get("Camera.Menu.VideoRes").to_uri(BASE);
        assert_eq!(
            uri,
            "http://192.72.1.1/cgi-bin/Config.cgi?action=get&property=Camera.Menu.VideoRes"
        );
    }

    #[test]
    fn test_set_uri_appends_value() {
        let uri = RequestSpec::set("brightness", 5).to_uri(BASE);
        assert_eq!(
            uri,
            "http://192.72.1.1/cgi-bin/Config.cgi?action=set&property=brightness&value=5"
        );
    }

    #[test]
    fn test_uri_is_not_percent_encoded() {
        let uri = RequestSpec::set("Net.WIFI_AP.SSID", "my cam&co").to_uri(BASE);
        assert!(uri.ends_with("&property=Net.WIFI_AP.SSID&value=my cam&co"));
    }

    #[test]
    fn test_empty_property_passes_through() {
        let uri = RequestSpec::get("").to_uri(BASE);
        assert!(uri.ends_with("?action=get&property="));
    }

    #[test]
    fn test_action_keywords() {
        assert_eq!(Action::Get.to_string(), "get");
        assert_eq!(Action::Set.as_str(), "set");
    }
}
