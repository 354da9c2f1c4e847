use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod error;
pub mod imaging;
pub mod logging;
pub mod paths;
pub mod replay;
pub mod schema;
pub mod settings;
mod test_util;

pub use error::SchemaError;
pub use schema::{
    CompileOptions, CompileOutput, Diagnostic, DiagnosticKind, FieldRecord, RegionRecord,
    SchemaCompiler, TrailingBlock,
};
pub use settings::Settings;

#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub application: String,
    pub regions: PathBuf,
    pub base_forms: Option<PathBuf>,
    pub schemas: Option<PathBuf>,
    pub settings_path: Option<String>,
    /// Use these settings as-is instead of reading any settings file.
    pub settings: Option<Settings>,
}

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub application: String,
    pub base_forms: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub settings_path: Option<String>,
    /// Use these settings as-is instead of reading any settings file.
    pub settings: Option<Settings>,
}

/// Compiles a region file and writes `<schemas>/<application>-schema.json`.
///
/// On failure any existing document for the application is removed, so a
/// stale schema is never mistaken for the result of this run.
pub fn run_compile(config: CompileConfig) -> Result<String> {
    let settings = resolve_settings(config.settings, &config.settings_path)?;
    let schemas_dir = config.schemas.unwrap_or(settings.schemas_dir.clone());
    let schema_path = paths::schema_path(&schemas_dir, &config.application);

    let compiler = SchemaCompiler::new(compile_options(
        &settings,
        config.base_forms,
        &config.application,
    ));
    let output = match compiler.compile_file(&config.regions) {
        Ok(output) => output,
        Err(err) => {
            discard_stale(&schema_path);
            return Err(err).with_context(|| {
                format!("failed to compile {}", config.regions.display())
            });
        }
    };

    write_or_discard(&schema_path, || {
        schema::write_schema(&schema_path, &output.fields)
    })?;

    Ok(format_compile_summary(&output, &schema_path))
}

/// Crops every region of a compiled schema into the debug folder.
pub fn run_replay(config: ReplayConfig) -> Result<String> {
    let settings = resolve_settings(config.settings, &config.settings_path)?;
    let schema_path = config
        .schema
        .unwrap_or_else(|| paths::schema_path(&settings.schemas_dir, &config.application));
    let output_dir = config.output.unwrap_or(settings.debug_dir.clone());
    let base_forms = config.base_forms.unwrap_or(settings.base_forms_dir.clone());

    let fields = schema::read_schema(&schema_path)
        .with_context(|| format!("failed to read schema: {}", schema_path.display()))?;
    replay::prepare_output_dir(&output_dir, &settings.replay_folders)
        .with_context(|| format!("failed to prepare {}", output_dir.display()))?;

    let mut pages =
        imaging::PageImages::new(&base_forms, &config.application, &settings.image_extension);
    let report = replay::replay_schema(&fields, &mut pages, &output_dir)
        .with_context(|| format!("failed to replay {}", schema_path.display()))?;

    Ok(format!(
        "wrote {} crops for {} fields to {}",
        report.crops.len(),
        fields.len(),
        output_dir.display()
    ))
}

pub fn compile_options(
    settings: &Settings,
    base_forms: Option<PathBuf>,
    application: &str,
) -> CompileOptions {
    CompileOptions {
        base_dir: base_forms.unwrap_or(settings.base_forms_dir.clone()),
        application: application.to_string(),
        image_extension: settings.image_extension.clone(),
        checkbox_type: settings.checkbox_type.clone(),
        trailing_block: settings.trailing_block,
    }
}

fn resolve_settings(
    fixed: Option<Settings>,
    settings_path: &Option<String>,
) -> Result<Settings> {
    match fixed {
        Some(settings) => Ok(settings),
        None => settings::load_settings(settings_path.as_deref().map(Path::new)),
    }
}

/// Runs the schema write; if it fails, the previous document is removed too.
fn write_or_discard<F>(schema_path: &Path, write: F) -> Result<()>
where
    F: FnOnce() -> error::Result<()>,
{
    if let Err(err) = write() {
        discard_stale(schema_path);
        return Err(err)
            .with_context(|| format!("failed to write schema: {}", schema_path.display()));
    }
    Ok(())
}

fn discard_stale(schema_path: &Path) {
    if schema_path.is_file()
        && let Err(err) = fs::remove_file(schema_path)
    {
        warn!(
            "compile: could not remove stale schema {}: {}",
            schema_path.display(),
            err
        );
    }
}

fn format_compile_summary(output: &CompileOutput, schema_path: &Path) -> String {
    let mut summary = format!(
        "wrote {} fields ({} regions) to {}",
        output.fields.len(),
        output.region_count(),
        schema_path.display()
    );
    if !output.diagnostics.is_empty() {
        summary.push_str(&format!(
            "\nskipped {} region lines:",
            output.diagnostics.len()
        ));
        for diagnostic in &output.diagnostics {
            summary.push_str("\n  ");
            summary.push_str(&diagnostic.to_string());
        }
    }
    summary
}
