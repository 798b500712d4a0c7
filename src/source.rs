use std::path::PathBuf;
use std::process::Command;
use tracing::info;

use crate::error::{RepackageError, Result};

/// Spigot BuildData class mappings for 1.16.5, pinned to a commit.
pub const DEFAULT_CLASS_MAPPINGS_URL: &str = "https://hub.spigotmc.org/stash/projects/SPIGOT/repos/builddata/raw/mappings/bukkit-1.16.5-cl.csrg?at=80d35549ec67b87a0cdf0d897abbe826ba34ac27";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    File(PathBuf),
    Url(String),
}

impl MappingSource {
    pub fn describe(&self) -> String {
        match self {
            MappingSource::File(path) => path.display().to_string(),
            MappingSource::Url(url) => url.clone(),
        }
    }

    pub fn load(&self) -> Result<String> {
        match self {
            MappingSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| RepackageError::FileReadFailed {
                    path: path.clone(),
                    source,
                })
            }
            MappingSource::Url(url) => download(url),
        }
    }
}

fn download(url: &str) -> Result<String> {
    let fetch_failed = |message: String| RepackageError::MappingFetchFailed {
        source_desc: url.to_string(),
        message,
    };

    info!("Downloading class mappings...");
    let output = Command::new("curl")
        .args(["-L", "--fail", "--silent", "--show-error", url])
        .output()
        .map_err(|e| fetch_failed(format!("failed to execute curl ({e})")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(fetch_failed(format!(
            "curl exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let text = String::from_utf8(output.stdout)
        .map_err(|_| fetch_failed("response is not valid UTF-8".to_string()))?;
    info!("Done downloading class mappings.");
    Ok(text)
}
