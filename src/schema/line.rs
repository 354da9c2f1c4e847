#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    FieldHeader,
    RegionLine,
    Separator,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based; for `EndOfInput` this is one past the last line.
    pub number: usize,
    pub raw: &'a str,
    pub kind: LineKind,
}

/// Classifies a single line of a region file.
///
/// Headers start with a letter in the first column and contain at least one
/// comma. Anything else that is not blank is a region line, so stray text
/// such as `foo bar` ends up as a recoverable malformed region.
pub fn classify(raw: &str) -> LineKind {
    if raw.trim().is_empty() {
        return LineKind::Separator;
    }
    match raw.chars().next() {
        Some(ch) if ch.is_alphabetic() && raw.contains(',') => LineKind::FieldHeader,
        _ => LineKind::RegionLine,
    }
}

/// Tags every line of `text`, then yields a single `EndOfInput`.
///
/// A leading byte order mark is dropped.
pub fn classify_lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    text.lines()
        .enumerate()
        .map(|(idx, raw)| Line {
            number: idx + 1,
            raw,
            kind: classify(raw),
        })
        .chain(std::iter::once_with(move || Line {
            number: text.lines().count() + 1,
            raw: "",
            kind: LineKind::EndOfInput,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_column() {
        assert_eq!(classify("NAME,TEXT,1,STRING,NONE:"), LineKind::FieldHeader);
        assert_eq!(classify("énom,TEXT,1,STRING,NONE:"), LineKind::FieldHeader);
        assert_eq!(classify("100 x 30 @ (10, 20)"), LineKind::RegionLine);
        assert_eq!(classify(" NAME,TEXT,1,STRING,NONE:"), LineKind::RegionLine);
        assert_eq!(classify("foo bar"), LineKind::RegionLine);
        assert_eq!(classify("BROKEN,TEXT"), LineKind::FieldHeader);
        assert_eq!(classify(""), LineKind::Separator);
        assert_eq!(classify("   \t"), LineKind::Separator);
    }

    #[test]
    fn ends_with_a_single_end_of_input() {
        let text = "A,B,1,C,D:\r\n1 x 1 @ (0, 0)\r\n\r\n";
        let lines: Vec<_> = classify_lines(text).collect();
        let kinds: Vec<_> = lines.iter().map(|line| line.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::FieldHeader,
                LineKind::RegionLine,
                LineKind::Separator,
                LineKind::EndOfInput,
            ]
        );
        assert_eq!(lines[1].raw, "1 x 1 @ (0, 0)");
        assert_eq!(lines[1].number, 2);
        assert_eq!(lines[3].number, 4);
    }

    #[test]
    fn byte_order_mark_is_stripped_before_classifying() {
        let lines: Vec<_> = classify_lines("\u{FEFF}A,B,1,C,D:\n").collect();
        assert_eq!(lines[0].kind, LineKind::FieldHeader);
        assert_eq!(lines[0].raw, "A,B,1,C,D:");
    }

    #[test]
    fn empty_input_is_only_end_of_input() {
        let lines: Vec<_> = classify_lines("").collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, LineKind::EndOfInput);
    }
}
