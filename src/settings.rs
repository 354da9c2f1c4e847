use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::replay::DEFAULT_FOLDERS;
use crate::schema::{DEFAULT_CHECKBOX_TYPE, TrailingBlock};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_forms_dir: PathBuf,
    pub schemas_dir: PathBuf,
    pub debug_dir: PathBuf,
    pub image_extension: String,
    pub checkbox_type: String,
    pub trailing_block: TrailingBlock,
    pub replay_folders: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_forms_dir: PathBuf::from("base-forms"),
            schemas_dir: PathBuf::from("schemas"),
            debug_dir: PathBuf::from("debug"),
            image_extension: "jpg".to_string(),
            checkbox_type: DEFAULT_CHECKBOX_TYPE.to_string(),
            trailing_block: TrailingBlock::Flush,
            replay_folders: DEFAULT_FOLDERS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    paths: Option<PathSettings>,
    compile: Option<CompileSettings>,
    replay: Option<ReplaySettings>,
}

#[derive(Debug, Default, Deserialize)]
struct PathSettings {
    base_forms: Option<String>,
    schemas: Option<String>,
    debug: Option<String>,
    image_extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CompileSettings {
    checkbox_type: Option<String>,
    trailing_block: Option<TrailingBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplaySettings {
    folders: Option<Vec<String>>,
}

/// Loads the built-in defaults, then every settings file that exists, in
/// order: `ocr-schema.toml`, `ocr-schema.local.toml`,
/// `$HOME/.ocr-schema/settings.toml`, and finally `extra_path`.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    let defaults: SettingsFile =
        toml::from_str(DEFAULT_SETTINGS_TOML).with_context(|| "failed to parse built-in settings")?;
    settings.merge(defaults);

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("ocr-schema.toml"));
    ordered_paths.push(PathBuf::from("ocr-schema.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    merge_files(&mut settings, &ordered_paths)?;
    Ok(settings)
}

fn merge_files(settings: &mut Settings, ordered_paths: &[PathBuf]) -> Result<()> {
    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }
    Ok(())
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(paths) = incoming.paths {
            if let Some(dir) = non_empty(paths.base_forms) {
                self.base_forms_dir = PathBuf::from(dir);
            }
            if let Some(dir) = non_empty(paths.schemas) {
                self.schemas_dir = PathBuf::from(dir);
            }
            if let Some(dir) = non_empty(paths.debug) {
                self.debug_dir = PathBuf::from(dir);
            }
            if let Some(ext) = non_empty(paths.image_extension) {
                self.image_extension = ext.trim_start_matches('.').to_string();
            }
        }
        if let Some(compile) = incoming.compile {
            if let Some(name) = non_empty(compile.checkbox_type) {
                self.checkbox_type = name;
            }
            if let Some(policy) = compile.trailing_block {
                self.trailing_block = policy;
            }
        }
        if let Some(replay) = incoming.replay
            && let Some(folders) = replay.folders
        {
            self.replay_folders = folders
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".ocr-schema"))
        }
    })
}
