//! Column descriptors
//!
//! A column descriptor is static configuration for one displayed slot. The
//! whole list is replaced at once and its order is the display order.

use super::format::ColumnFormat;
use anyhow::{anyhow, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Matches `12`, `12px` and `30%`
static SIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*(px|%)?\s*$").unwrap());

/// Horizontal alignment of cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Side a column is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedSide {
    Left,
    Right,
}

/// Special column kinds render engine state instead of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Normal,
    /// Checkbox reflecting selection membership
    Selection,
    /// 1-based ordinal within the derived view
    Index,
    /// Toggle reflecting expansion membership
    Expand,
}

/// Column width, either absolute terminal cells or a share of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SizeSpec", into = "SizeSpec")]
pub enum Size {
    Cells(u16),
    Percent(u16),
}

/// Serialized form of [`Size`]: a bare number or a string with a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SizeSpec {
    Number(u16),
    Text(String),
}

impl Size {
    /// Parse `"12"`, `"12px"` or `"30%"`
    pub fn parse(text: &str) -> Result<Size> {
        let caps = SIZE_REGEX
            .captures(text)
            .ok_or_else(|| anyhow!("Invalid column size: {:?}", text))?;
        let amount: u16 = caps[1].parse()?;
        match caps.get(2).map(|m| m.as_str()) {
            Some("%") => Ok(Size::Percent(amount.min(100))),
            _ => Ok(Size::Cells(amount)),
        }
    }

    /// Resolve to a cell count for a table `total` cells wide
    pub fn resolve(&self, total: u16) -> u16 {
        match self {
            Size::Cells(n) => *n,
            Size::Percent(p) => ((total as u32 * *p as u32) / 100) as u16,
        }
    }
}

impl TryFrom<SizeSpec> for Size {
    type Error = anyhow::Error;

    fn try_from(spec: SizeSpec) -> Result<Self> {
        match spec {
            SizeSpec::Number(n) => Ok(Size::Cells(n)),
            SizeSpec::Text(text) => Size::parse(&text),
        }
    }
}

impl From<Size> for SizeSpec {
    fn from(size: Size) -> Self {
        SizeSpec::Text(size.to_string())
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Cells(n) => write!(f, "{}", n),
            Size::Percent(p) => write!(f, "{}%", p),
        }
    }
}

/// Configuration for one column
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Field key to read from each row
    #[serde(default, alias = "prop")]
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub width: Option<Size>,
    #[serde(default)]
    pub min_width: Option<Size>,
    #[serde(default)]
    pub fixed: Option<FixedSide>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub align: Align,
    /// Header alignment, falls back to `align`
    #[serde(default)]
    pub header_align: Option<Align>,
    #[serde(default, alias = "type")]
    pub kind: ColumnKind,
    /// Declarative formatter applied when no formatter callback is installed
    #[serde(default)]
    pub format: Option<ColumnFormat>,
}

impl ColumnDescriptor {
    /// A plain column reading `key`, labelled `label`
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    /// A special column (selection, index or expand) with no field key
    pub fn special(kind: ColumnKind) -> Self {
        let label = match kind {
            ColumnKind::Selection => "",
            ColumnKind::Index => "#",
            ColumnKind::Expand | ColumnKind::Normal => "",
        };
        Self {
            label: label.to_string(),
            kind,
            width: Some(Size::Cells(3)),
            align: Align::Center,
            ..Default::default()
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn width(mut self, width: Size) -> Self {
        self.width = Some(width);
        self
    }

    pub fn format(mut self, format: ColumnFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Label shown in the header, the key when no label is configured
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    pub fn effective_header_align(&self) -> Align {
        self.header_align.unwrap_or(self.align)
    }

    pub fn is_normal(&self) -> bool {
        self.kind == ColumnKind::Normal
    }
}
