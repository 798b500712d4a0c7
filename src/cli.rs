use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "patch-repackage")]
#[command(about = "Rewrite class references in patch files after moving classes out of a legacy package")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Remap every patch directory into a fresh sibling directory.
    Repackage {
        #[arg(value_name = "PATCH_DIR", required = true)]
        patch_dirs: Vec<PathBuf>,

        #[command(flatten)]
        mappings: MappingArgs,

        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        #[arg(long, value_name = "SUFFIX")]
        output_suffix: Option<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the rename rules derived from the mappings.
    Rules {
        #[command(flatten)]
        mappings: MappingArgs,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Remap a single patch file and print the result.
    Remap {
        patch_file: PathBuf,

        #[command(flatten)]
        mappings: MappingArgs,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct MappingArgs {
    #[arg(long, value_name = "FILE", conflicts_with = "mappings_url")]
    pub mappings: Option<PathBuf>,

    #[arg(long, value_name = "URL")]
    pub mappings_url: Option<String>,

    /// Package every old class is assumed to live in.
    #[arg(long, value_name = "PKG")]
    pub legacy_package: Option<String>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
