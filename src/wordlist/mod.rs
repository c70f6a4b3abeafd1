use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog;

#[derive(Debug, Error)]
pub enum WordlistError {
    #[error("no known URL for wordlist '{name}', download it manually")]
    UnknownWordlist { name: String },

    #[error("failed to download wordlist '{name}': {reason}")]
    DownloadFailed { name: String, reason: String },

    #[error("failed to prepare wordlist directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Maps wordlist names to local files, fetching known lists on demand.
#[derive(Clone, Debug)]
pub struct WordlistResolver {
    dir: PathBuf,
    registry: Vec<(String, String)>,
}

impl WordlistResolver {
    /// Resolver backed by the built-in SecLists registry.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let registry = catalog::WORDLISTS
            .iter()
            .filter_map(|(name, _)| catalog::wordlist_url(name).map(|url| (name.to_string(), url)))
            .collect();
        Self::with_registry(dir, registry)
    }

    pub fn with_registry(dir: impl Into<PathBuf>, registry: Vec<(String, String)>) -> Self {
        Self {
            dir: dir.into(),
            registry,
        }
    }

    fn url_for(&self, name: &str) -> Option<&str> {
        self.registry
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf, WordlistError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| WordlistError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;
        let path = self.dir.join(name);
        if path.is_file() {
            return Ok(path);
        }
        let url = self
            .url_for(name)
            .ok_or_else(|| WordlistError::UnknownWordlist {
                name: name.to_string(),
            })?;
        info!(%name, %url, "downloading wordlist");
        download(name, url, &path)?;
        info!(path = %path.display(), "wordlist saved");
        Ok(path)
    }
}

fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    }
}

/// Streams `url` into `<dest>.part` and renames it into place. The partial
/// file is removed on any failure.
fn download(name: &str, url: &str, dest: &Path) -> Result<(), WordlistError> {
    let failed = |reason: String| WordlistError::DownloadFailed {
        name: name.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(600))
        .build()
        .map_err(|e| failed(format!("failed to build HTTP client: {e}")))?;
    let response = client.get(url).send().map_err(|e| failed(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP {}", status.as_u16())));
    }

    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let pb = progress_bar(response.content_length());
    let written = (|| -> io::Result<u64> {
        let mut file = File::create(&part)?;
        let mut reader = pb.wrap_read(response);
        let n = io::copy(&mut reader, &mut file)?;
        file.flush()?;
        file.sync_all()?;
        Ok(n)
    })()
    .and_then(|n| std::fs::rename(&part, dest).map(|_| n));
    pb.finish_and_clear();

    match written {
        Ok(n) => {
            info!(bytes = n, "download complete");
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_file(&part) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %part.display(), error = %cleanup, "failed to remove partial download");
                }
            }
            Err(failed(e.to_string()))
        }
    }
}
