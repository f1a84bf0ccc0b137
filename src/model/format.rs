//! Declarative column formatters
//!
//! Configured per column in the column file, e.g.
//!
//! ```yaml
//! - key: joined
//!   format: { type: date, input: "%Y-%m-%d", output: "%d %b %Y" }
//! - key: balance
//!   format: { type: number, decimals: 2 }
//! ```

use super::value::display_value;
use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_date_input() -> String {
    "%Y-%m-%d".to_string()
}

fn default_true_label() -> String {
    "yes".to_string()
}

fn default_false_label() -> String {
    "no".to_string()
}

/// Built-in cell formatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnFormat {
    /// Fixed number of decimals
    Number {
        #[serde(default)]
        decimals: usize,
    },
    /// Re-format a date or date-time string
    Date {
        #[serde(default = "default_date_input")]
        input: String,
        output: String,
    },
    Uppercase,
    Lowercase,
    /// Replace booleans with labels
    Boolean {
        #[serde(default = "default_true_label")]
        true_label: String,
        #[serde(default = "default_false_label")]
        false_label: String,
    },
}

impl ColumnFormat {
    /// Format a cell value. Null and missing values format as empty text.
    pub fn apply(&self, value: Option<&Value>) -> Result<String> {
        let value = match value {
            None | Some(Value::Null) => return Ok(String::new()),
            Some(v) => v,
        };

        match self {
            ColumnFormat::Number { decimals } => {
                let number = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| anyhow!("Not a number: {}", value))?;
                Ok(format!("{:.*}", decimals, number))
            }
            ColumnFormat::Date { input, output } => {
                let text = value
                    .as_str()
                    .ok_or_else(|| anyhow!("Not a date string: {}", value))?;
                if let Ok(dt) = NaiveDateTime::parse_from_str(text, input) {
                    return Ok(dt.format(output).to_string());
                }
                let date = NaiveDate::parse_from_str(text, input)?;
                Ok(date.format(output).to_string())
            }
            ColumnFormat::Uppercase => Ok(display_value(Some(value)).to_uppercase()),
            ColumnFormat::Lowercase => Ok(display_value(Some(value)).to_lowercase()),
            ColumnFormat::Boolean {
                true_label,
                false_label,
            } => match value {
                Value::Bool(true) => Ok(true_label.clone()),
                Value::Bool(false) => Ok(false_label.clone()),
                other => Err(anyhow!("Not a boolean: {}", other)),
            },
        }
    }
}
