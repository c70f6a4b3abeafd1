use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::catalog::DEFAULT_PROFILE;
use crate::scan::DEFAULT_STATUS_CODES;

pub const ENV_WORDLIST_DIR: &str = "WORDLIST_DIR";
pub const ENV_HISTORY_FILE: &str = "FFUF_HISTORY_FILE";
pub const ENV_FFUF_PATH: &str = "FFUF_PATH";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub wordlist_dir: Option<String>,
    pub history_file: Option<String>,
    #[serde(alias = "ffuf")]
    pub ffuf_path: Option<String>,
    pub status_codes: Option<String>,
    pub profile: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    let windows_home = || {
        let mut home = PathBuf::from(env::var_os("HOMEDRIVE")?);
        home.push(env::var_os("HOMEPATH")?);
        Some(home)
    };
    ["HOME", "USERPROFILE"]
        .iter()
        .find_map(|key| env::var_os(key).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
        .or_else(windows_home)
}

fn app_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ffuf-agent")
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".ffuf-agent").join("config.yml"))
}

/// Expands a leading `~` (alone or followed by a separator) to the home
/// directory. Other paths, including `~user`, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with(['/', '\\']) => &rest[1..],
        _ => return PathBuf::from(path),
    };
    match home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(ConfigFile::default()),
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

/// Values taken from flags; each wins over the environment and config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub wordlist_dir: Option<String>,
    pub history_file: Option<String>,
    pub ffuf_path: Option<String>,
    pub no_color: bool,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub wordlist_dir: PathBuf,
    pub history_file: PathBuf,
    pub ffuf_path: String,
    pub status_codes: String,
    pub profile: String,
    pub no_color: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Resolves settings with precedence flag > environment > config file > default.
    pub fn resolve(
        overrides: Overrides,
        cfg: ConfigFile,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |flag: Option<String>, key: &str, file: Option<String>| {
            non_empty(flag)
                .or_else(|| non_empty(env_var(key)))
                .or_else(|| non_empty(file))
        };

        let wordlist_dir = pick(overrides.wordlist_dir, ENV_WORDLIST_DIR, cfg.wordlist_dir)
            .map(|p| expand_tilde(&p))
            .unwrap_or_else(|| app_dir().join("wordlists"));
        let history_file = pick(overrides.history_file, ENV_HISTORY_FILE, cfg.history_file)
            .map(|p| expand_tilde(&p))
            .unwrap_or_else(|| {
                home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".ffuf_agent_history.json")
            });
        let ffuf_path = pick(overrides.ffuf_path, ENV_FFUF_PATH, cfg.ffuf_path)
            .map(|p| expand_tilde(&p).to_string_lossy().to_string())
            .unwrap_or_else(|| "ffuf".to_string());

        Self {
            wordlist_dir,
            history_file,
            ffuf_path,
            status_codes: non_empty(cfg.status_codes)
                .unwrap_or_else(|| DEFAULT_STATUS_CODES.to_string()),
            profile: non_empty(cfg.profile).unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            no_color: overrides.no_color || cfg.no_color.unwrap_or(false),
        }
    }

    pub fn from_env(overrides: Overrides, cfg: ConfigFile) -> Self {
        Self::resolve(overrides, cfg, |key| env::var(key).ok())
    }
}
