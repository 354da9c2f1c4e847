use std::sync::OnceLock;

use regex::Regex;

use crate::imaging::Rect;

/// A region line split into its rectangle and optional `:label` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRegion {
    pub rect: Rect,
    pub entry: Option<String>,
}

fn region_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([0-9]+)\s*[xX]\s*([0-9]+)\s*@\s*\(\s*([0-9]+)\s*,\s*([0-9]+)\s*\)\s*$")
            .expect("region pattern is valid")
    })
}

/// Parses `W x H @ (L, T)` with an optional `:label`.
///
/// Returns `None` when the geometry does not match as a whole or a value
/// does not fit in `u32`; the caller decides how to report it.
pub fn parse_region_line(raw: &str) -> Option<ParsedRegion> {
    let raw = raw.trim();
    let (geometry, entry) = match raw.split_once(':') {
        Some((geometry, label)) => (geometry, Some(label.trim())),
        None => (raw, None),
    };

    let captures = region_pattern().captures(geometry)?;
    let number = |idx: usize| captures.get(idx)?.as_str().parse::<u32>().ok();
    let width = number(1)?;
    let height = number(2)?;
    let left = number(3)?;
    let top = number(4)?;

    Some(ParsedRegion {
        rect: Rect::new(left, top, width, height),
        entry: entry.filter(|label| !label.is_empty()).map(str::to_string),
    })
}
