//! Batch remapping of patch directories.
//!
//! Each source directory gets a fresh sibling output directory. The files of
//! one directory are remapped in parallel on a rayon pool; directories are
//! processed one after another. Outputs are first written into a staging
//! subdirectory and renamed into place, so a failed run never leaves a
//! half-written patch. The staging directory is named so that it cannot
//! collide with any listed patch, and it is removed once the batch finishes.

use rayon::ThreadPool;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::error::{RepackageError, Result};
use crate::mapping::RuleSet;
use crate::remap::PatchRemapper;

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_repackaged";

const STAGING_DIR_NAME: &str = ".staging";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker count; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    pub output_suffix: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            threads: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub line_count: usize,
    pub rewritten_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
    pub source_dir: String,
    pub output_dir: String,
    pub files_written: usize,
    pub files_changed: usize,
    pub duration_ms: u64,
    pub files: Vec<FileReport>,
}

pub struct BatchRunner {
    remapper: PatchRemapper,
    options: BatchOptions,
    pool: Option<ThreadPool>,
}

impl BatchRunner {
    pub fn new(rules: RuleSet, options: BatchOptions) -> Result<Self> {
        let pool = match options.threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n.max(1))
                    .thread_name(|i| format!("patch-repackage-{i}"))
                    .build()?,
            ),
            None => None,
        };
        Ok(Self {
            remapper: PatchRemapper::new(rules),
            options,
            pool,
        })
    }

    pub fn remapper(&self) -> &PatchRemapper {
        &self.remapper
    }

    /// Stops at the first directory that fails; earlier reports are dropped
    /// along with the error.
    pub fn run(&self, source_dirs: &[PathBuf]) -> Result<Vec<DirectoryReport>> {
        source_dirs.iter().map(|dir| self.run_directory(dir)).collect()
    }

    pub fn run_directory(&self, source_dir: &Path) -> Result<DirectoryReport> {
        let start = Instant::now();
        info!("Preparing patches in {}", source_dir.display());

        let patches = list_patch_files(source_dir)?;
        let output_dir = create_output_dir(source_dir, &self.options.output_suffix)?;
        debug!(
            "{} patch files, writing to {}",
            patches.len(),
            output_dir.display()
        );

        let staging_dir = output_dir.join(staging_dir_name(&patches));
        std::fs::create_dir(&staging_dir).map_err(|source| {
            RepackageError::OutputDirectoryFailed {
                path: staging_dir.clone(),
                source,
            }
        })?;

        let dir_name = display_name(source_dir);
        let outcome = self.install(|| {
            patches
                .par_iter()
                .map(|patch| self.process_file(&dir_name, patch, &staging_dir, &output_dir))
                .collect::<Result<Vec<_>>>()
        });
        if let Err(e) = std::fs::remove_dir_all(&staging_dir) {
            warn!("Failed to remove {}: {e}", staging_dir.display());
        }
        let mut files = outcome?;
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        let report = DirectoryReport {
            source_dir: source_dir.to_string_lossy().to_string(),
            output_dir: output_dir.to_string_lossy().to_string(),
            files_written: files.len(),
            files_changed: files.iter().filter(|f| f.rewritten_lines > 0).count(),
            duration_ms: start.elapsed().as_millis() as u64,
            files,
        };
        info!(
            "Done preparing {} ({} files, {} changed)",
            source_dir.display(),
            report.files_written,
            report.files_changed
        );
        Ok(report)
    }

    fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match self.pool.as_ref() {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    fn process_file(
        &self,
        dir_name: &str,
        patch: &Path,
        staging_dir: &Path,
        output_dir: &Path,
    ) -> Result<FileReport> {
        let file_name = display_name(patch);
        info!("Processing {dir_name}/{file_name}...");

        let remapped = self.remapper.remap_file(patch)?;
        write_atomically(
            &staging_dir.join(&file_name),
            &output_dir.join(&file_name),
            &remapped.content,
        )?;

        Ok(FileReport {
            file_name,
            line_count: remapped.line_count,
            rewritten_lines: remapped.rewritten_lines,
        })
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_patch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let listing_failed = |source| RepackageError::DirectoryListingFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(listing_failed)? {
        let entry = entry.map_err(listing_failed)?;
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_file() => files.push(path),
            Ok(t) if t.is_symlink() && path.is_file() => files.push(path),
            Ok(_) => debug!("Skipping non-file entry {}", path.display()),
            Err(e) => warn!("Skipping unreadable entry {}: {e}", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

/// Creates `<parent>/<name><suffix>-<millis>`, adding a counter if a previous
/// run in the same millisecond already took that name.
pub fn create_output_dir(source_dir: &Path, suffix: &str) -> Result<PathBuf> {
    let parent = source_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let base = format!("{}{suffix}-{millis}", display_name(source_dir));

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            base.clone()
        } else {
            format!("{base}-{attempt}")
        };
        let candidate = parent.join(name);
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => {
                return Err(RepackageError::OutputDirectoryFailed {
                    path: candidate,
                    source,
                });
            }
        }
    }
}

/// `.staging`, or `.staging-N` when a listed patch already uses that name.
fn staging_dir_name(patches: &[PathBuf]) -> String {
    let taken: HashSet<String> = patches.iter().map(|p| display_name(p)).collect();
    let mut name = STAGING_DIR_NAME.to_string();
    let mut attempt = 0u32;
    while taken.contains(&name) {
        attempt += 1;
        name = format!("{STAGING_DIR_NAME}-{attempt}");
    }
    name
}

fn write_atomically(staged: &Path, target: &Path, content: &str) -> Result<()> {
    let write_failed = |source| RepackageError::FileWriteFailed {
        path: target.to_path_buf(),
        source,
    };

    std::fs::write(staged, content).map_err(write_failed)?;
    if let Err(e) = std::fs::rename(staged, target) {
        let _ = std::fs::remove_file(staged);
        return Err(write_failed(e));
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
