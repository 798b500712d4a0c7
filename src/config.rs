use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::batch::{BatchOptions, DEFAULT_OUTPUT_SUFFIX};
use crate::cli::MappingArgs;
use crate::mapping::{DEFAULT_LEGACY_PACKAGE, RemapConfig, RuleSet, parse_mappings};
use crate::source::{DEFAULT_CLASS_MAPPINGS_URL, MappingSource};

pub const MAPPINGS_ENV: &str = "PATCH_REPACKAGE_MAPPINGS";

/// Flag file, then flag URL, then `PATCH_REPACKAGE_MAPPINGS`, then the
/// pinned BuildData URL.
pub fn resolve_mapping_source(args: &MappingArgs) -> MappingSource {
    if let Some(p) = args.mappings.clone() {
        return MappingSource::File(p);
    }

    if let Some(url) = args.mappings_url.clone() {
        return MappingSource::Url(url);
    }

    if let Ok(p) = env::var(MAPPINGS_ENV)
        && !p.is_empty()
    {
        return MappingSource::File(PathBuf::from(p));
    }

    MappingSource::Url(DEFAULT_CLASS_MAPPINGS_URL.to_string())
}

pub fn resolve_remap_config(args: &MappingArgs) -> RemapConfig {
    let legacy_package = args
        .legacy_package
        .as_deref()
        .map(normalize_package_prefix)
        .unwrap_or_else(|| DEFAULT_LEGACY_PACKAGE.to_string());

    RemapConfig {
        legacy_package,
        ..RemapConfig::default()
    }
}

pub fn resolve_batch_options(threads: Option<usize>, output_suffix: Option<String>) -> BatchOptions {
    BatchOptions {
        threads,
        output_suffix: output_suffix.unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string()),
    }
}

/// Fetches and parses the mappings named by `args`. Any malformed record
/// aborts the whole run.
pub fn load_rules(args: &MappingArgs) -> Result<RuleSet> {
    let source = resolve_mapping_source(args);
    let config = resolve_remap_config(args);
    let text = source.load()?;
    let rules = parse_mappings(&text, &config)
        .with_context(|| format!("Failed to parse class mappings from {}", source.describe()))?;
    Ok(rules)
}

/// Accepts `a.b.c`, `a.b.c.` or `a/b/c/` and returns `a.b.c.`.
fn normalize_package_prefix(raw: &str) -> String {
    let mut pkg = raw.trim().replace('/', ".");
    if !pkg.is_empty() && !pkg.ends_with('.') {
        pkg.push('.');
    }
    pkg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(mappings: Option<&str>, url: Option<&str>, pkg: Option<&str>) -> MappingArgs {
        MappingArgs {
            mappings: mappings.map(PathBuf::from),
            mappings_url: url.map(str::to_string),
            legacy_package: pkg.map(str::to_string),
        }
    }

    #[test]
    fn explicit_file_wins() {
        let source = resolve_mapping_source(&args(Some("m.csrg"), None, None));
        assert_eq!(source, MappingSource::File(PathBuf::from("m.csrg")));
    }

    #[test]
    fn explicit_url_is_used() {
        let source = resolve_mapping_source(&args(None, Some("https://example.invalid/m"), None));
        assert_eq!(source, MappingSource::Url("https://example.invalid/m".to_string()));
    }

    #[test]
    fn legacy_package_is_normalized() {
        assert_eq!(normalize_package_prefix("org/bukkit/craftbukkit/"), "org.bukkit.craftbukkit.");
        assert_eq!(normalize_package_prefix("org.bukkit.craftbukkit"), "org.bukkit.craftbukkit.");
        assert_eq!(normalize_package_prefix(" a.b. "), "a.b.");

        let config = resolve_remap_config(&args(None, None, None));
        assert_eq!(config.legacy_package, DEFAULT_LEGACY_PACKAGE);
    }

    #[test]
    fn batch_options_default_suffix() {
        let opts = resolve_batch_options(Some(2), None);
        assert_eq!(opts.threads, Some(2));
        assert_eq!(opts.output_suffix, DEFAULT_OUTPUT_SUFFIX);
    }
}
