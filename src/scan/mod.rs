use std::path::{Path, PathBuf};

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ScanType;

/// Placeholder the tool substitutes with each wordlist entry.
pub const FUZZ_KEYWORD: &str = "FUZZ";

pub const DEFAULT_STATUS_CODES: &str = "200,204,301,403";

static STATUS_CODES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(,[0-9]+)*$").unwrap());

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::Invalid { field, .. } => field,
        }
    }
}

/// Raw option values gathered from the user, before validation.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub scan_type: ScanType,
    /// Full URL containing `FUZZ`, or a bare domain for host-fuzzing scan types.
    pub target: String,
    pub wordlist: PathBuf,
    pub status_codes: String,
    pub threads: u32,
    pub color: bool,
    pub auto_calibrate: bool,
    pub recursion: bool,
    pub recursion_depth: u32,
    pub headers: Vec<String>,
    pub proxy: String,
    pub delay_ms: u64,
    pub decoy_list: String,
    /// Defaults to a timestamped file in the working directory.
    pub output: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            scan_type: ScanType::DirectoryDiscovery,
            target: String::new(),
            wordlist: PathBuf::new(),
            status_codes: DEFAULT_STATUS_CODES.to_string(),
            threads: 40,
            color: true,
            auto_calibrate: true,
            recursion: false,
            recursion_depth: 1,
            headers: Vec::new(),
            proxy: String::new(),
            delay_ms: 0,
            decoy_list: String::new(),
            output: None,
        }
    }
}

/// A validated set of options for a single ffuf run.
///
/// Only obtainable through [`ScanConfiguration::new`] or by deserializing a
/// history record; stored records must pass [`ScanConfiguration::validate`]
/// again before they are executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfiguration {
    #[serde(rename = "wordlist")]
    wordlist_path: PathBuf,
    #[serde(rename = "url")]
    target_url: String,
    #[serde(rename = "status_codes")]
    status_code_filter: String,
    #[serde(rename = "threads")]
    concurrency: u32,
    #[serde(rename = "color", default)]
    color_output: bool,
    #[serde(rename = "autocal", default)]
    auto_calibrate: bool,
    #[serde(rename = "recursion", default)]
    use_recursion: bool,
    #[serde(rename = "depth", default = "default_depth")]
    recursion_depth: u32,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(rename = "proxy", default)]
    proxy_url: String,
    #[serde(rename = "delay", default)]
    delay_millis: u64,
    #[serde(rename = "decoy", default)]
    decoy_list_path: String,
    #[serde(rename = "output")]
    output_path: PathBuf,
}

fn default_depth() -> u32 {
    1
}

pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "ffuf_results_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Builds the target for host-fuzzing scans: `example.com` becomes
/// `http://FUZZ.example.com`; an explicit scheme is kept.
pub fn host_fuzz_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    match domain.split_once("://") {
        Some((scheme, host)) => format!("{scheme}://{FUZZ_KEYWORD}.{host}"),
        None => format!("http://{FUZZ_KEYWORD}.{domain}"),
    }
}

/// Returns the header name of a raw `Key: Value` line.
pub fn header_name(header: &str) -> Option<&str> {
    let (name, _) = header.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

impl ScanConfiguration {
    pub fn new(options: ScanOptions) -> Result<Self, ConfigError> {
        let target_url = if options.scan_type.fuzzes_host() {
            let domain = options.target.trim();
            if domain.is_empty() {
                return Err(ConfigError::invalid("target_url", "base domain is empty"));
            }
            host_fuzz_url(domain)
        } else {
            options.target.trim().to_string()
        };

        let config = Self {
            wordlist_path: options.wordlist,
            target_url,
            status_code_filter: options.status_codes.trim().to_string(),
            concurrency: options.threads,
            color_output: options.color,
            auto_calibrate: options.auto_calibrate,
            use_recursion: options.recursion,
            recursion_depth: options.recursion_depth,
            headers: options
                .headers
                .into_iter()
                .map(|h| h.trim().to_string())
                .collect(),
            proxy_url: options.proxy.trim().to_string(),
            delay_millis: options.delay_ms,
            decoy_list_path: options.decoy_list.trim().to_string(),
            output_path: options.output.unwrap_or_else(default_output_path),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every invariant, including that the wordlist is a readable file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.is_empty() {
            return Err(ConfigError::invalid("target_url", "target URL is empty"));
        }
        if !self.target_url.contains(FUZZ_KEYWORD) {
            return Err(ConfigError::invalid(
                "target_url",
                format!("'{}' does not contain the {FUZZ_KEYWORD} placeholder", self.target_url),
            ));
        }
        if !STATUS_CODES_RE.is_match(&self.status_code_filter) {
            return Err(ConfigError::invalid(
                "status_code_filter",
                format!(
                    "'{}' is not a comma-separated list of status codes",
                    self.status_code_filter
                ),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid(
                "concurrency",
                "expected positive integer",
            ));
        }
        if self.use_recursion && self.recursion_depth == 0 {
            return Err(ConfigError::invalid(
                "recursion_depth",
                "expected positive integer",
            ));
        }
        if let Some(bad) = self.headers.iter().find(|h| header_name(h).is_none()) {
            return Err(ConfigError::invalid(
                "headers",
                format!("'{bad}' is not in 'Key: Value' form"),
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("output_path", "output path is empty"));
        }
        if !self.wordlist_path.is_file() {
            return Err(ConfigError::invalid(
                "wordlist_path",
                format!("'{}' is not a readable file", self.wordlist_path.display()),
            ));
        }
        Ok(())
    }

    pub fn wordlist_path(&self) -> &Path {
        &self.wordlist_path
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn status_code_filter(&self) -> &str {
        &self.status_code_filter
    }

    pub fn concurrency(&self) -> u32 {
        self.concurrency
    }

    pub fn color_output(&self) -> bool {
        self.color_output
    }

    pub fn auto_calibrate(&self) -> bool {
        self.auto_calibrate
    }

    pub fn use_recursion(&self) -> bool {
        self.use_recursion
    }

    pub fn recursion_depth(&self) -> u32 {
        self.recursion_depth
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Empty when no proxy is used.
    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    pub fn delay_millis(&self) -> u64 {
        self.delay_millis
    }

    /// Only honoured for recursive scans.
    pub fn decoy_list_path(&self) -> &str {
        &self.decoy_list_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}
