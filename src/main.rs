use anyhow::{Context, Result};
use clap::Parser;
use patch_repackage::batch::{BatchRunner, DirectoryReport};
use patch_repackage::cli::{Cli, Commands, LogLevel, OutputFormat};
use patch_repackage::config::{load_rules, resolve_batch_options};
use patch_repackage::mapping::RuleSet;
use patch_repackage::remap::PatchRemapper;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Serialize)]
struct RepackageResult {
    rules: usize,
    duration_ms: u64,
    directories: Vec<DirectoryReport>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Commands::Repackage {
            patch_dirs,
            mappings,
            threads,
            output_suffix,
            format,
        } => {
            let start = Instant::now();
            let rules = load_rules(&mappings)?;
            info!(">>> Preparing patches for repackage ({} rules)", rules.len());

            let runner = BatchRunner::new(rules, resolve_batch_options(threads, output_suffix))?;
            let directories = runner.run(&patch_dirs)?;
            info!(">>> Done preparing patches");

            let result = RepackageResult {
                rules: runner.remapper().rules().len(),
                duration_ms: start.elapsed().as_millis() as u64,
                directories,
            };
            print_repackage_result(&result, format)?;
        }
        Commands::Rules { mappings, format } => {
            let rules = load_rules(&mappings)?;
            print_rules(&rules, format)?;
        }
        Commands::Remap {
            patch_file,
            mappings,
            output,
        } => {
            let remapper = PatchRemapper::new(load_rules(&mappings)?);
            let remapped = remapper.remap_file(&patch_file)?;
            write_output(&remapped.content, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_repackage_result(result: &RepackageResult, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("rules: {}\n", result.rules));
            out.push_str(&format!("duration_ms: {}\n", result.duration_ms));
            for d in &result.directories {
                out.push_str(&format!(
                    "- {} -> {} (files: {}, changed: {})\n",
                    d.source_dir, d.output_dir, d.files_written, d.files_changed
                ));
            }
            out
        }
    };
    write_output(&content, None)
}

fn print_rules(rules: &RuleSet, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(rules)?,
        OutputFormat::Text => rules
            .iter()
            .map(|r| {
                format!(
                    "{} -> {}\t{} -> {}\n",
                    r.old_fq_name, r.new_fq_name, r.old_file_path, r.new_file_path
                )
            })
            .collect::<String>(),
    };
    write_output(&content, None)
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
