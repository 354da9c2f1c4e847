use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::header::{FieldHeader, parse_field_header};
use super::line::{LineKind, classify_lines};
use super::region::parse_region_line;
use super::{
    CheckboxMark, DEFAULT_CHECKBOX_TYPE, Diagnostic, DiagnosticKind, FieldRecord, RegionRecord,
};
use crate::error::{Result, SchemaError};
use crate::imaging::{PageImages, average_brightness};

/// What to do with a field block that reaches end of input without a
/// closing blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingBlock {
    /// Commit it if it collected at least one region.
    #[default]
    Flush,
    /// Drop it; only blank lines close a block.
    Require,
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Directory holding one sub-directory of page images per application.
    pub base_dir: PathBuf,
    pub application: String,
    pub image_extension: String,
    pub checkbox_type: String,
    pub trailing_block: TrailingBlock,
}

impl CompileOptions {
    pub fn new(base_dir: impl Into<PathBuf>, application: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            application: application.into(),
            image_extension: "jpg".to_string(),
            checkbox_type: DEFAULT_CHECKBOX_TYPE.to_string(),
            trailing_block: TrailingBlock::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub fields: Vec<FieldRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn region_count(&self) -> usize {
        self.fields.iter().map(|field| field.regions.len()).sum()
    }
}

struct OpenField {
    header: FieldHeader,
    regions: Vec<RegionRecord>,
}

impl OpenField {
    fn finish(self) -> FieldRecord {
        let FieldHeader {
            name,
            field_type,
            page_number,
            data_type,
            correction,
        } = self.header;
        FieldRecord {
            name,
            field_type,
            page_number,
            data_type,
            correction,
            regions: self.regions,
        }
    }
}

enum State {
    AwaitingField,
    InField(OpenField),
}

pub struct SchemaCompiler {
    options: CompileOptions,
}

impl SchemaCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn compile_file(&self, path: &Path) -> Result<CompileOutput> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::io(path, source))?;
        self.compile(&text)
    }

    /// Compiles a whole region file.
    ///
    /// Page images are decoded lazily, at most once per page, and released
    /// when this returns. Any `Err` means no schema should be written.
    pub fn compile(&self, text: &str) -> Result<CompileOutput> {
        let mut pages = PageImages::new(
            &self.options.base_dir,
            &self.options.application,
            &self.options.image_extension,
        );
        let mut output = CompileOutput::default();
        let mut state = State::AwaitingField;

        for line in classify_lines(text) {
            state = match (line.kind, state) {
                (LineKind::FieldHeader, previous) => {
                    if let State::InField(open) = previous {
                        self.close_unterminated(open, &mut output);
                    }
                    let header = parse_field_header(line.number, line.raw)?;
                    debug!("compile: field {} ({})", header.name, header.field_type);
                    State::InField(OpenField {
                        header,
                        regions: Vec::new(),
                    })
                }
                (LineKind::RegionLine, State::AwaitingField) => {
                    report(
                        &mut output,
                        line.number,
                        line.raw,
                        DiagnosticKind::OrphanRegionLine,
                    );
                    State::AwaitingField
                }
                (LineKind::RegionLine, State::InField(mut open)) => {
                    self.push_region(&mut open, &mut pages, &mut output, line.number, line.raw)?;
                    State::InField(open)
                }
                (LineKind::Separator, State::InField(open)) => {
                    output.fields.push(open.finish());
                    State::AwaitingField
                }
                (LineKind::Separator, State::AwaitingField) => State::AwaitingField,
                (LineKind::EndOfInput, State::InField(open)) => {
                    self.close_unterminated(open, &mut output);
                    State::AwaitingField
                }
                (LineKind::EndOfInput, State::AwaitingField) => State::AwaitingField,
            };
        }

        info!(
            "compile: {} fields, {} regions, {} diagnostics, {} page images",
            output.fields.len(),
            output.region_count(),
            output.diagnostics.len(),
            pages.loaded_pages()
        );
        Ok(output)
    }

    fn push_region(
        &self,
        open: &mut OpenField,
        pages: &mut PageImages,
        output: &mut CompileOutput,
        number: usize,
        raw: &str,
    ) -> Result<()> {
        let Some(parsed) = parse_region_line(raw) else {
            report(output, number, raw, DiagnosticKind::MalformedRegionLine);
            return Ok(());
        };

        let checkbox = if open.header.field_type == self.options.checkbox_type {
            let Some(entry) = parsed.entry else {
                report(output, number, raw, DiagnosticKind::MissingEntryLabel);
                return Ok(());
            };
            let image = pages.get(&open.header.page_number)?;
            let brightness = average_brightness(image, parsed.rect)?;
            Some(CheckboxMark { entry, brightness })
        } else {
            if let Some(entry) = parsed.entry {
                debug!(
                    "compile: line {}: ignoring entry {:?} on {} field {}",
                    number, entry, open.header.field_type, open.header.name
                );
            }
            None
        };

        open.regions.push(RegionRecord {
            index: open.regions.len(),
            region: parsed.rect,
            checkbox,
        });
        Ok(())
    }

    /// Handles a block that was not closed by a blank line, either because
    /// input ended or because the next header followed immediately.
    fn close_unterminated(&self, open: OpenField, output: &mut CompileOutput) {
        match self.options.trailing_block {
            TrailingBlock::Flush if !open.regions.is_empty() => {
                debug!("compile: committing unterminated field {}", open.header.name);
                output.fields.push(open.finish());
            }
            TrailingBlock::Flush => {
                debug!(
                    "compile: dropping unterminated field {} with no regions",
                    open.header.name
                );
            }
            TrailingBlock::Require => {
                warn!(
                    "compile: field {} has no closing blank line; dropped",
                    open.header.name
                );
            }
        }
    }
}

fn report(output: &mut CompileOutput, line: usize, raw: &str, kind: DiagnosticKind) {
    let diagnostic = Diagnostic {
        line,
        raw: raw.to_string(),
        kind,
    };
    warn!("compile: {}", diagnostic);
    output.diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Rect;
    use crate::test_util::write_solid_page;
    use tempfile::tempdir;

    fn compiler_for(base_dir: &Path) -> SchemaCompiler {
        SchemaCompiler::new(CompileOptions::new(base_dir, "app"))
    }

    #[test]
    fn compiles_a_text_field() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("NAME,TEXT,1,STRING,NONE:\n100 x 30 @ (10, 20)\n\n")
            .unwrap();

        assert!(output.diagnostics.is_empty());
        assert_eq!(output.fields.len(), 1);
        let field = &output.fields[0];
        assert_eq!(field.name, "NAME");
        assert_eq!(field.field_type, "TEXT");
        assert_eq!(field.page_number, "1");
        assert_eq!(field.data_type, "STRING");
        assert_eq!(field.correction.correction_type, "NONE");
        assert_eq!(
            field.regions,
            vec![RegionRecord {
                index: 0,
                region: Rect::new(10, 20, 100, 30),
                checkbox: None,
            }]
        );
    }

    #[test]
    fn checkbox_regions_carry_entry_and_brightness() {
        let dir = tempdir().expect("tempdir");
        write_solid_page(dir.path(), "app", "1", 64, 48, 255);
        let output = compiler_for(dir.path())
            .compile("OPT,CHECKBOX,1,BOOL,NONE:\n20 x 20 @ (5,5):YES\n20 x 20 @ (30,5):NO\n\n")
            .unwrap();

        let regions = &output.fields[0].regions;
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].index, 0);
        assert_eq!(regions[1].index, 1);
        let entries: Vec<_> = regions
            .iter()
            .map(|region| region.checkbox.as_ref().unwrap().entry.as_str())
            .collect();
        assert_eq!(entries, vec!["YES", "NO"]);
        for region in regions {
            let brightness = region.checkbox.as_ref().unwrap().brightness;
            assert!(brightness > 250.0, "brightness {brightness}");
        }
    }

    #[test]
    fn malformed_region_line_is_skipped_and_reported() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("NAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\nfoo bar\n10 x 10 @ (20, 0)\n\n")
            .unwrap();

        let regions = &output.fields[0].regions;
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].index, 0);
        assert_eq!(regions[1].index, 1);
        assert_eq!(regions[1].region, Rect::new(20, 0, 10, 10));
        assert_eq!(
            output.diagnostics,
            vec![Diagnostic {
                line: 3,
                raw: "foo bar".to_string(),
                kind: DiagnosticKind::MalformedRegionLine,
            }]
        );
    }

    #[test]
    fn non_checkbox_fields_ignore_entry_labels() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("NAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0):IGNORED\n\n")
            .unwrap();
        assert_eq!(output.fields[0].regions[0].checkbox, None);
    }

    #[test]
    fn checkbox_region_without_label_is_reported() {
        let dir = tempdir().expect("tempdir");
        write_solid_page(dir.path(), "app", "1", 64, 48, 255);
        let output = compiler_for(dir.path())
            .compile("OPT,CHECKBOX,1,BOOL,NONE:\n20 x 20 @ (5,5)\n20 x 20 @ (30,5):NO\n\n")
            .unwrap();

        let regions = &output.fields[0].regions;
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].index, 0);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::MissingEntryLabel);
    }

    #[test]
    fn checkbox_without_page_image_aborts() {
        let dir = tempdir().expect("tempdir");
        let err = compiler_for(dir.path())
            .compile("OPT,CHECKBOX,4,BOOL,NONE:\n20 x 20 @ (5,5):YES\n\n")
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingImageSource { .. }));
    }

    #[test]
    fn checkbox_outside_page_aborts() {
        let dir = tempdir().expect("tempdir");
        write_solid_page(dir.path(), "app", "1", 32, 32, 255);
        let err = compiler_for(dir.path())
            .compile("OPT,CHECKBOX,1,BOOL,NONE:\n20 x 20 @ (20,5):YES\n\n")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRegion { .. }));
    }

    #[test]
    fn malformed_header_aborts() {
        let dir = tempdir().expect("tempdir");
        let err = compiler_for(dir.path())
            .compile("NAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n\nBROKEN,TEXT\n")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MalformedFieldHeader { line: 4, .. }
        ));
    }

    #[test]
    fn sentinel_is_kept_as_an_ordinary_record() {
        let dir = tempdir().expect("tempdir");
        let text = "NAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n\nDUMMY,DUMMY,-1,DUMMY,DUMMY:\n\n";
        let output = compiler_for(dir.path()).compile(text).unwrap();
        assert_eq!(output.fields.len(), 2);
        assert_eq!(output.fields[1].name, "DUMMY");
        assert_eq!(output.fields[1].page_number, "-1");
        assert!(output.fields[1].regions.is_empty());
    }

    #[test]
    fn repeated_blank_lines_do_not_duplicate_fields() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("\n\nNAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n\n\n\n")
            .unwrap();
        assert_eq!(output.fields.len(), 1);
    }

    #[test]
    fn region_line_before_any_header_is_reported() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("10 x 10 @ (0, 0)\n\nNAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n\n")
            .unwrap();
        assert_eq!(output.fields.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::OrphanRegionLine);
        assert_eq!(output.diagnostics[0].line, 1);
    }

    #[test]
    fn trailing_block_is_flushed_by_default() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("NAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)")
            .unwrap();
        assert_eq!(output.fields.len(), 1);
    }

    #[test]
    fn trailing_block_without_regions_is_not_flushed() {
        let dir = tempdir().expect("tempdir");
        let text = "NAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n\nDUMMY,DUMMY,-1,DUMMY,DUMMY:\n";
        let output = compiler_for(dir.path()).compile(text).unwrap();
        assert_eq!(output.fields.len(), 1);
        assert_eq!(output.fields[0].name, "NAME");
    }

    #[test]
    fn trailing_block_is_dropped_when_separator_required() {
        let dir = tempdir().expect("tempdir");
        let mut options = CompileOptions::new(dir.path(), "app");
        options.trailing_block = TrailingBlock::Require;
        let output = SchemaCompiler::new(options)
            .compile("A,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n\nB,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n")
            .unwrap();
        assert_eq!(output.fields.len(), 1);
        assert_eq!(output.fields[0].name, "A");
    }

    #[test]
    fn header_directly_after_regions_drops_previous_block_when_separator_required() {
        let dir = tempdir().expect("tempdir");
        let mut options = CompileOptions::new(dir.path(), "app");
        options.trailing_block = TrailingBlock::Require;
        let output = SchemaCompiler::new(options)
            .compile("A,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\nB,TEXT,1,STRING,NONE:\n5 x 5 @ (1, 1)\n\n")
            .unwrap();
        assert_eq!(output.fields.len(), 1);
        assert_eq!(output.fields[0].name, "B");
        assert_eq!(output.fields[0].regions[0].region, Rect::new(1, 1, 5, 5));
    }

    #[test]
    fn leading_byte_order_mark_does_not_hide_the_first_header() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("\u{FEFF}NAME,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\n\n")
            .unwrap();
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_eq!(output.fields[0].name, "NAME");
    }

    #[test]
    fn header_directly_after_regions_commits_previous_block() {
        let dir = tempdir().expect("tempdir");
        let output = compiler_for(dir.path())
            .compile("A,TEXT,1,STRING,NONE:\n10 x 10 @ (0, 0)\nB,TEXT,1,STRING,NONE:\n5 x 5 @ (1, 1)\n1 x 1 @ (2, 2)\n\n")
            .unwrap();
        assert_eq!(output.fields.len(), 2);
        assert_eq!(output.fields[1].regions.len(), 2);
        assert_eq!(output.fields[1].regions[1].index, 1);
    }

    #[test]
    fn custom_checkbox_type_name() {
        let dir = tempdir().expect("tempdir");
        write_solid_page(dir.path(), "app", "2", 40, 40, 0);
        let mut options = CompileOptions::new(dir.path(), "app");
        options.checkbox_type = "TICK".to_string();
        let output = SchemaCompiler::new(options)
            .compile("OPT,TICK,2,BOOL,NONE:\n10 x 10 @ (5, 5):X\n\nOTHER,CHECKBOX,2,BOOL,NONE:\n10 x 10 @ (5, 5)\n\n")
            .unwrap();
        let mark = output.fields[0].regions[0].checkbox.as_ref().unwrap();
        assert!(mark.brightness < 5.0);
        assert_eq!(output.fields[1].regions[0].checkbox, None);
    }

    #[test]
    fn compile_file_reads_from_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("region.txt");
        fs::write(&path, "NAME,TEXT,1,STRING,NONE:\n1 x 2 @ (3, 4)\n\n").expect("write");
        let output = compiler_for(dir.path()).compile_file(&path).unwrap();
        assert_eq!(output.fields[0].regions[0].region, Rect::new(3, 4, 1, 2));
    }
}
