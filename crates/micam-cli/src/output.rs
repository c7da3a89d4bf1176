//! Output formatting for micam-cli (table, json)

use clap::ValueEnum;
use colored::Colorize;
use micam_client::DeviceResponse;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(data));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
        }
    }

    /// Print key-value pairs
    pub fn print_kv(&self, pairs: &[(&str, String)]) {
        match self.format {
            OutputFormat::Table => {
                for (key, value) in pairs {
                    println!("{}: {}", key.bold(), value);
                }
            }
            OutputFormat::Json => {
                let map: serde_json::Map<String, serde_json::Value> = pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
    }
}

// =============================================================================
// Display types
// =============================================================================

/// Property display for get/set commands
#[derive(Debug, Tabled, Serialize)]
pub struct PropertyRow {
    #[tabled(rename = "Property")]
    pub property: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl PropertyRow {
    /// Row for a parsed answer; `requested` covers responses without a name
    pub fn from_response(requested: &str, response: &DeviceResponse) -> Self {
        Self {
            property: response
                .property_name
                .clone()
                .unwrap_or_else(|| requested.to_string()),
            value: response.value.clone(),
            status: status_label(response.success),
        }
    }

    /// Row for a request that never produced an answer
    pub fn failed(requested: &str, error: impl std::fmt::Display) -> Self {
        Self {
            property: requested.to_string(),
            value: String::new(),
            status: format!("Error: {}", error),
        }
    }
}

pub fn status_label(success: bool) -> String {
    if success { "ok" } else { "error" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_prefers_echoed_property() {
        let resp = DeviceResponse::parse("1\nok\nCamera.Preview=1", Some("x")).unwrap();
        let row = PropertyRow::from_response("x", &resp);
        assert_eq!(row.property, "Camera.Preview");
        assert_eq!(row.status, "ok");
    }

    #[test]
    fn test_row_without_property_uses_request() {
        let resp = DeviceResponse::parse("\nerror", None).unwrap();
        let row = PropertyRow::from_response("Camera.Preview", &resp);
        assert_eq!(row.property, "Camera.Preview");
        assert_eq!(row.value, "");
        assert_eq!(row.status, "error");
    }
}
