//! Class mapping parsing and rename rule derivation.
//!
//! Mapping files use the Spigot BuildData class format: one record per line,
//! fields separated by single spaces, `#` comments. Only the second field (the
//! mapped class name) is used. Every old class is assumed to live directly in
//! one legacy package, so a rule only needs the destination name to derive
//! both the old and the new spelling of a class.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{RepackageError, Result};

pub const DEFAULT_LEGACY_PACKAGE: &str = "net.minecraft.server.";
pub const DEFAULT_SOURCE_SUFFIX: &str = ".java";

const INNER_CLASS_MARKER: char = '$';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapConfig {
    /// Dotted package prefix including the trailing `.`.
    pub legacy_package: String,
    pub source_suffix: String,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            legacy_package: DEFAULT_LEGACY_PACKAGE.to_string(),
            source_suffix: DEFAULT_SOURCE_SUFFIX.to_string(),
        }
    }
}

impl RemapConfig {
    pub fn legacy_path_prefix(&self) -> String {
        self.legacy_package.replace('.', "/")
    }
}

/// One class relocation, in both dotted-name and source-path spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RenameRule {
    pub old_simple_name: String,
    pub old_fq_name: String,
    pub old_file_path: String,
    pub new_fq_name: String,
    pub new_file_path: String,
}

impl RenameRule {
    pub fn new(new_fq_name: &str, config: &RemapConfig) -> Self {
        let simple = new_fq_name.rsplit('.').next().unwrap_or(new_fq_name);
        Self {
            old_simple_name: simple.to_string(),
            old_fq_name: format!("{}{simple}", config.legacy_package),
            old_file_path: format!(
                "{}{simple}{}",
                config.legacy_path_prefix(),
                config.source_suffix
            ),
            new_fq_name: new_fq_name.to_string(),
            new_file_path: format!("{}{}", new_fq_name.replace('.', "/"), config.source_suffix),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.old_fq_name == self.new_fq_name
    }
}

/// Deduplicated, immutable collection of non-identity rules.
///
/// Rules keep the order of their first occurrence. Replacement is cumulative,
/// so with `World` and `WorldServer` both mapped, whichever comes first in the
/// mapping file wins on `WorldServer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<RenameRule>,
}

impl RuleSet {
    pub fn from_rules(rules: impl IntoIterator<Item = RenameRule>) -> Self {
        let mut seen = HashSet::new();
        let rules = rules
            .into_iter()
            .filter(|r| !r.is_identity() && seen.insert(r.clone()))
            .collect();
        Self { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenameRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RenameRule;
    type IntoIter = std::slice::Iter<'a, RenameRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn parse_mappings(text: &str, config: &RemapConfig) -> Result<RuleSet> {
    let mut rules = Vec::new();

    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.contains(INNER_CLASS_MARKER) {
            continue;
        }

        let malformed = |reason| RepackageError::MalformedMappingLine {
            line_number: idx + 1,
            line: line.to_string(),
            reason,
        };
        let destination = match line.split(' ').nth(1) {
            None => return Err(malformed("missing destination field")),
            Some("") => return Err(malformed("empty destination field")),
            Some(field) => field,
        };

        rules.push(RenameRule::new(&destination.replace('/', "."), config));
    }

    Ok(RuleSet::from_rules(rules))
}
