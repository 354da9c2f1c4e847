use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ocr-schema",
    version,
    about = "Compile form region files into OCR field schemas"
)]
struct Cli {
    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings", global = true)]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a region file into <schemas>/<application>-schema.json
    Compile {
        /// Application (form) name; selects <base-forms>/<application>/ page images
        #[arg(short = 'a', long = "application")]
        application: String,

        /// Region description file
        #[arg(short = 'i', long = "regions", default_value = "region.txt")]
        regions: PathBuf,

        /// Directory holding page images per application (default from settings)
        #[arg(short = 'b', long = "base-forms")]
        base_forms: Option<PathBuf>,

        /// Output directory for schema documents (default from settings)
        #[arg(short = 's', long = "schemas")]
        schemas: Option<PathBuf>,
    },
    /// Crop every schema region into <output>/<type>/<name>_<index>.jpg
    Replay {
        /// Application (form) name
        #[arg(short = 'a', long = "application")]
        application: String,

        /// Schema document (default: <schemas>/<application>-schema.json)
        #[arg(long = "schema")]
        schema: Option<PathBuf>,

        /// Directory holding page images per application (default from settings)
        #[arg(short = 'b', long = "base-forms")]
        base_forms: Option<PathBuf>,

        /// Output directory for crops (default from settings)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ocr_schema::logging::init(cli.verbose)?;

    let output = match cli.command {
        Command::Compile {
            application,
            regions,
            base_forms,
            schemas,
        } => ocr_schema::run_compile(ocr_schema::CompileConfig {
            application,
            regions,
            base_forms,
            schemas,
            settings_path: cli.read_settings,
            settings: None,
        })?,
        Command::Replay {
            application,
            schema,
            base_forms,
            output,
        } => ocr_schema::run_replay(ocr_schema::ReplayConfig {
            application,
            base_forms,
            schema,
            output,
            settings_path: cli.read_settings,
            settings: None,
        })?,
    };

    println!("{}", output);
    Ok(())
}
