//! Configuration Vault – reads/writes `~/.eliza/config.toml`.

use eliza_types::DEFAULT_USER_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted settings stored in `~/.eliza/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP port for `eliza serve`.
    #[serde(default = "default_web_port")]
    pub web_port: u16,

    /// Name the web front end reports until the user gives theirs.
    #[serde(default = "default_user_name")]
    pub default_user_name: String,

    /// Record every turn to the transcript database.
    #[serde(default)]
    pub transcript_enabled: bool,

    /// SQLite file the transcript is written to.
    #[serde(default = "default_transcript_path")]
    pub transcript_path: String,
}

fn default_web_port() -> u16 {
    8000
}
fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}
fn default_transcript_path() -> String {
    config_dir().join("transcript.db").to_string_lossy().into_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_port: default_web_port(),
            default_user_name: default_user_name(),
            transcript_enabled: false,
            transcript_path: default_transcript_path(),
        }
    }
}

fn home_dir() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string())
}

/// `~/.eliza`
pub fn config_dir() -> PathBuf {
    PathBuf::from(home_dir()).join(".eliza")
}

/// Return the path to `~/.eliza/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(&home_dir())
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".eliza").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// The config in effect: the file if present, defaults otherwise, with
/// environment overrides applied in both cases.
pub fn effective() -> Result<Config, String> {
    let mut cfg = load()?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config = toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `ELIZA_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ELIZA_WEB_PORT` | `web_port` |
/// | `ELIZA_DEFAULT_NAME` | `default_user_name` |
/// | `ELIZA_TRANSCRIPT` | `transcript_enabled` (`1`/`true`/`yes`, `0`/`false`/`no`) |
/// | `ELIZA_TRANSCRIPT_PATH` | `transcript_path` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ELIZA_WEB_PORT")
        && let Ok(port) = v.trim().parse::<u16>()
    {
        cfg.web_port = port;
    }
    if let Ok(v) = std::env::var("ELIZA_DEFAULT_NAME")
        && !v.trim().is_empty()
    {
        cfg.default_user_name = v.trim().to_string();
    }
    if let Ok(v) = std::env::var("ELIZA_TRANSCRIPT")
        && let Some(enabled) = parse_flag(&v)
    {
        cfg.transcript_enabled = enabled;
    }
    if let Ok(v) = std::env::var("ELIZA_TRANSCRIPT_PATH")
        && !v.trim().is_empty()
    {
        cfg.transcript_path = v;
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Save the config to disk, creating `~/.eliza/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Owner read/write only (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
