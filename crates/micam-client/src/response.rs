//! Device response decoding
//!
//! The firmware answers with a short plain-text body:
//!
//! ```text
//! <value>
//! <ok|error-token>
//! [<property>=<echoed value>]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{MiCamClientError, Result};

/// Parsed answer to a single device request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceResponse {
    /// Returned or confirmed property value (line 1)
    pub value: String,
    /// Line 2 equals `ok`, ignoring case
    pub success: bool,
    /// Property the answer refers to
    #[serde(default)]
    pub property_name: Option<String>,
    /// Body, minus trailing whitespace, the other fields were taken from
    pub raw_response: String,
}

impl DeviceResponse {
    /// Parse a response body
    ///
    /// `fallback_property` is used when the body carries no third line.
    /// Only trailing whitespace is trimmed: the device answers a rejected
    /// request with an empty value line (`"\nerror"`), which must survive.
    pub fn parse(body: &str, fallback_property: Option<&str>) -> Result<Self> {
        let raw = body.trim_end();
        let mut lines = raw.split('\n');

        // split() always yields at least one item
        let value = lines.next().unwrap_or_default();
        let status = lines
            .next()
            .ok_or_else(|| MiCamClientError::MalformedResponse(raw.to_string()))?;

        let property_name = match lines.next() {
            Some(line) => line.split('=').next().map(str::to_string),
            None => fallback_property.map(str::to_string),
        };

        Ok(Self {
            value: value.to_string(),
            success: status.eq_ignore_ascii_case("ok"),
            property_name,
            raw_response: raw.to_string(),
        })
    }

    /// Lines of the raw response
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.raw_response.split('\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_full_response() {
        let resp = DeviceResponse::parse("5\nok\nbrightness=5", Some("other")).unwrap();
        assert_eq!(resp.value, "5");
        assert!(resp.success);
        assert_eq!(resp.property_name.as_deref(), Some("brightness"));
        assert_eq!(resp.raw_response, "5\nok\nbrightness=5");
    }

    #[test]
    fn test_parse_error_token_uses_fallback() {
        let resp = DeviceResponse::parse("\nerror", Some("brightness")).unwrap();
        assert_eq!(resp.value, "");
        assert!(!resp.success);
        assert_eq!(resp.property_name.as_deref(), Some("brightness"));
    }

    #[test]
    fn test_parse_without_fallback_leaves_property_unset() {
        let resp = DeviceResponse::parse("1\nOK", None).unwrap();
        assert!(resp.success);
        assert_eq!(resp.property_name, None);
    }

    #[test]
    fn test_status_is_case_insensitive() {
        assert!(DeviceResponse::parse("x\nOk", None).unwrap().success);
        assert!(DeviceResponse::parse("x\noK", None).unwrap().success);
        assert!(!DeviceResponse::parse("x\nokay", None).unwrap().success);
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed_before_split() {
        let resp = DeviceResponse::parse("720P\nok\nVideoRes=720P\n\n", None).unwrap();
        assert_eq!(resp.value, "720P");
        assert_eq!(resp.raw_response, "720P\nok\nVideoRes=720P");
    }

    #[test]
    fn test_leading_empty_value_line_is_kept() {
        let resp = DeviceResponse::parse("\nerror\n", Some("Camera.Menu.EV")).unwrap();
        assert_eq!(resp.value, "");
        assert!(!resp.success);
        assert_eq!(resp.property_name.as_deref(), Some("Camera.Menu.EV"));
        assert_eq!(resp.raw_response, "\nerror");
    }

    #[test]
    fn test_property_ignores_everything_after_equals() {
        let resp = DeviceResponse::parse("a=b\nok\nSSID=cam=1", None).unwrap();
        assert_eq!(resp.value, "a=b");
        assert_eq!(resp.property_name.as_deref(), Some("SSID"));
    }

    #[test]
    fn test_third_line_without_equals_is_whole_line() {
        let resp = DeviceResponse::parse("1\nok\nTimeStamp", Some("x")).unwrap();
        assert_eq!(resp.property_name.as_deref(), Some("TimeStamp"));
    }

    #[test]
    fn test_inner_carriage_returns_are_kept() {
        let resp = DeviceResponse::parse("1\r\nok\r\nx=1", None).unwrap();
        assert_eq!(resp.value, "1\r");
        assert!(!resp.success);
    }

    #[test]
    fn test_single_line_is_malformed() {
        let err = DeviceResponse::parse("720P", Some("VideoRes")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_empty_body_is_malformed() {
        let err = DeviceResponse::parse("   \n ", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_lines() {
        let resp = DeviceResponse::parse("1\nok\nx=1", None).unwrap();
        assert_eq!(resp.lines().collect::<Vec<_>>(), vec!["1", "ok", "x=1"]);
    }
}
