//! Per-view presentation options

use serde::{Deserialize, Serialize};

fn default_empty_text() -> String {
    "No data".to_string()
}

fn default_true() -> bool {
    true
}

/// Row density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSize {
    Large,
    #[default]
    Medium,
    Small,
    Mini,
}

impl TableSize {
    /// Blank lines rendered between rows
    pub fn row_spacing(&self) -> u16 {
        match self {
            TableSize::Large => 1,
            TableSize::Medium | TableSize::Small | TableSize::Mini => 0,
        }
    }

    /// Horizontal padding on each side of a cell
    pub fn cell_padding(&self) -> usize {
        match self {
            TableSize::Large | TableSize::Medium => 1,
            TableSize::Small | TableSize::Mini => 0,
        }
    }
}

/// Options that change how the view is projected, not what it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Mark every other row
    #[serde(default)]
    pub stripe: bool,
    /// Track and highlight the current row on click
    #[serde(default)]
    pub highlight_current_row: bool,
    #[serde(default = "default_true")]
    pub show_header: bool,
    /// Shown when the derived view is empty
    #[serde(default = "default_empty_text")]
    pub empty_text: String,
    #[serde(default)]
    pub size: TableSize,
    /// Expand every row when rows are replaced
    #[serde(default)]
    pub default_expand_all: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            stripe: false,
            highlight_current_row: false,
            show_header: true,
            empty_text: default_empty_text(),
            size: TableSize::default(),
            default_expand_all: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let options: ViewOptions = serde_json::from_str(r#"{"stripe": true}"#).unwrap();
        assert!(options.stripe);
        assert!(options.show_header);
        assert_eq!(options.empty_text, "No data");
        assert_eq!(options.size, TableSize::Medium);
    }
}
