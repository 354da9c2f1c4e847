//! Region-file to schema compilation.
//!
//! A region file is a line-oriented description of form fields: a header
//! line per field, one line per rectangle, and a blank line closing each
//! block. [`SchemaCompiler`] turns it into an ordered list of
//! [`FieldRecord`]s which [`write_schema`] persists as JSON.

mod compiler;
mod header;
mod line;
mod region;
mod writer;

use serde::{Deserialize, Serialize};

use crate::imaging::Rect;

pub use compiler::{CompileOptions, CompileOutput, SchemaCompiler, TrailingBlock};
pub use header::{FieldHeader, parse_field_header};
pub use line::{Line, LineKind, classify, classify_lines};
pub use region::{ParsedRegion, parse_region_line};
pub use writer::{read_schema, write_schema};

pub const DEFAULT_CHECKBOX_TYPE: &str = "CHECKBOX";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub page_number: String,
    pub data_type: String,
    pub correction: Correction,
    pub regions: Vec<RegionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    #[serde(rename = "type")]
    pub correction_type: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub index: usize,
    pub region: Rect,
    /// Present exactly when the owning field is a checkbox.
    #[serde(flatten)]
    pub checkbox: Option<CheckboxMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxMark {
    pub entry: String,
    pub brightness: f64,
}

/// A region line that was skipped without aborting the compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub raw: String,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    MalformedRegionLine,
    MissingEntryLabel,
    OrphanRegionLine,
}

impl DiagnosticKind {
    pub fn describe(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedRegionLine => "invalid region line format",
            DiagnosticKind::MissingEntryLabel => "checkbox region has no entry label",
            DiagnosticKind::OrphanRegionLine => "region line before any field header",
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind.describe(), self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_region_has_no_checkbox_keys() {
        let region = RegionRecord {
            index: 0,
            region: Rect::new(10, 20, 100, 30),
            checkbox: None,
        };
        assert_eq!(
            serde_json::to_value(&region).unwrap(),
            json!({"index": 0, "region": [10, 20, 100, 30]})
        );
    }

    #[test]
    fn checkbox_region_flattens_entry_and_brightness() {
        let region = RegionRecord {
            index: 1,
            region: Rect::new(30, 5, 20, 20),
            checkbox: Some(CheckboxMark {
                entry: "NO".to_string(),
                brightness: 250.5,
            }),
        };
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(
            value,
            json!({"index": 1, "region": [30, 5, 20, 20], "entry": "NO", "brightness": 250.5})
        );
        let back: RegionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn field_record_uses_type_keys() {
        let field = FieldRecord {
            name: "NAME".to_string(),
            field_type: "TEXT".to_string(),
            page_number: "1".to_string(),
            data_type: "STRING".to_string(),
            correction: Correction {
                correction_type: "NONE".to_string(),
                details: String::new(),
            },
            regions: Vec::new(),
        };
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "TEXT");
        assert_eq!(value["correction"], json!({"type": "NONE", "details": ""}));
    }
}
