use super::Correction;
use crate::error::{Result, SchemaError};

/// Parsed `name,type,page_number,data_type,correction_type:correction_details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHeader {
    pub name: String,
    pub field_type: String,
    pub page_number: String,
    pub data_type: String,
    pub correction: Correction,
}

pub fn parse_field_header(line: usize, raw: &str) -> Result<FieldHeader> {
    let malformed = |reason| SchemaError::MalformedFieldHeader {
        line,
        raw: raw.to_string(),
        reason,
    };

    let fragments: Vec<&str> = raw.trim().split(',').map(str::trim).collect();
    let [name, field_type, page_number, data_type, correction] = fragments[..] else {
        return Err(malformed("expected 5 comma-separated fields"));
    };
    if name.is_empty() {
        return Err(malformed("empty field name"));
    }
    let Some((correction_type, details)) = correction.split_once(':') else {
        return Err(malformed("correction lacks a ':' separator"));
    };

    Ok(FieldHeader {
        name: name.to_string(),
        field_type: field_type.to_string(),
        page_number: page_number.to_string(),
        data_type: data_type.to_string(),
        correction: Correction {
            correction_type: correction_type.to_string(),
            details: details.to_string(),
        },
    })
}
