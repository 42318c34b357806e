//! Configuration loader
//!
//! Builds the application configuration from an optional file overlaid with
//! environment variables.
//!
//! ## Loading Strategy
//! 1. Start from an explicit file, a probed file, or the built-in defaults
//! 2. Overlay any `MAILSWEEP_*` environment variables that are set
//! 3. Validate the merged result
//!
//! ## Environment Variables
//! - `MAILSWEEP_API_BASE_URL`, `MAILSWEEP_PAGE_SIZE`, `MAILSWEEP_TIMEOUT_SECS`
//! - `MAILSWEEP_ACCESS_TOKEN`
//! - `MAILSWEEP_CLIENT_ID`, `MAILSWEEP_CLIENT_SECRET`, `MAILSWEEP_REFRESH_TOKEN`,
//!   `MAILSWEEP_TOKEN_URL`
//! - `MAILSWEEP_MAX_RETRIES`, `MAILSWEEP_BASE_DELAY_MS`, `MAILSWEEP_JITTER_FRACTION`
//! - `MAILSWEEP_BATCH_SIZE`, `MAILSWEEP_CONCURRENCY`, `MAILSWEEP_INTER_BATCH_DELAY_MS`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./mailsweep.{json,toml}` then `./config.{json,toml}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mailsweep_domain::{Config, Result, SweepError};

const FILE_STEMS: [&str; 2] = ["mailsweep", "config"];
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration using the probed file (if any) and the environment.
///
/// # Errors
/// Returns `SweepError::Config` if a file cannot be parsed, an environment
/// variable has an invalid value, or the merged configuration is invalid.
pub fn load() -> Result<Config> {
    load_with(None)
}

/// Like [`load`], but reads `path` instead of probing when given.
///
/// # Errors
/// Returns `SweepError::Config` if `path` does not exist, in addition to the
/// cases listed on [`load`].
pub fn load_with(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(Some(path))?,
        None => match probe_config_paths() {
            Some(found) => load_from_file(Some(found))?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from defaults and environment variables only.
///
/// # Errors
/// Returns `SweepError::Config` if a variable has an invalid value or the
/// result fails validation.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// The result is not validated; [`load_with`] validates after the
/// environment overlay.
///
/// # Errors
/// Returns `SweepError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SweepError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SweepError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SweepError::config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SweepError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SweepError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(SweepError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| {
            FILE_STEMS.iter().flat_map(move |stem| {
                FILE_EXTENSIONS.iter().map(move |ext| dir.join(format!("{stem}.{ext}")))
            })
        })
        .find(|path| path.is_file())
}

/// Overlay every `MAILSWEEP_*` variable that is set onto `config`.
fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(url) = env_string("MAILSWEEP_API_BASE_URL") {
        config.api.base_url = url;
    }
    env_parse("MAILSWEEP_PAGE_SIZE", &mut config.api.page_size)?;
    env_parse("MAILSWEEP_TIMEOUT_SECS", &mut config.api.timeout_secs)?;

    if let Some(token) = env_string("MAILSWEEP_ACCESS_TOKEN") {
        config.auth.access_token = Some(token);
    }
    if let Some(id) = env_string("MAILSWEEP_CLIENT_ID") {
        config.auth.client_id = Some(id);
    }
    if let Some(secret) = env_string("MAILSWEEP_CLIENT_SECRET") {
        config.auth.client_secret = Some(secret);
    }
    if let Some(token) = env_string("MAILSWEEP_REFRESH_TOKEN") {
        config.auth.refresh_token = Some(token);
    }
    if let Some(url) = env_string("MAILSWEEP_TOKEN_URL") {
        config.auth.token_url = url;
    }

    env_parse("MAILSWEEP_MAX_RETRIES", &mut config.retry.max_retries)?;
    env_parse("MAILSWEEP_BASE_DELAY_MS", &mut config.retry.base_delay_ms)?;
    env_parse("MAILSWEEP_JITTER_FRACTION", &mut config.retry.jitter_fraction)?;

    env_parse("MAILSWEEP_BATCH_SIZE", &mut config.batch.batch_size)?;
    env_parse("MAILSWEEP_CONCURRENCY", &mut config.batch.concurrency)?;
    env_parse("MAILSWEEP_INTER_BATCH_DELAY_MS", &mut config.batch.inter_batch_delay_ms)?;

    Ok(())
}

/// Non-empty, trimmed value of `key`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse `key` into `target` when set; leaves `target` untouched otherwise.
///
/// # Errors
/// Returns `SweepError::Config` if the value does not parse.
fn env_parse<T>(key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = env_string(key) {
        *target = raw
            .parse()
            .map_err(|e| SweepError::config(format!("Invalid value for {key}: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 14] = [
        "MAILSWEEP_API_BASE_URL",
        "MAILSWEEP_PAGE_SIZE",
        "MAILSWEEP_TIMEOUT_SECS",
        "MAILSWEEP_ACCESS_TOKEN",
        "MAILSWEEP_CLIENT_ID",
        "MAILSWEEP_CLIENT_SECRET",
        "MAILSWEEP_REFRESH_TOKEN",
        "MAILSWEEP_TOKEN_URL",
        "MAILSWEEP_MAX_RETRIES",
        "MAILSWEEP_BASE_DELAY_MS",
        "MAILSWEEP_JITTER_FRACTION",
        "MAILSWEEP_BATCH_SIZE",
        "MAILSWEEP_CONCURRENCY",
        "MAILSWEEP_INTER_BATCH_DELAY_MS",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(extension: &str, contents: &str) -> (NamedTempFile, PathBuf) {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        let path = file.path().with_extension(extension);
        std::fs::copy(file.path(), &path).expect("copy config");
        (file, path)
    }

    #[test]
    fn test_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MAILSWEEP_ACCESS_TOKEN", "ya29.env");
        std::env::set_var("MAILSWEEP_BATCH_SIZE", "16");
        std::env::set_var("MAILSWEEP_CONCURRENCY", "4");
        std::env::set_var("MAILSWEEP_JITTER_FRACTION", "0.1");

        let config = load_from_env().expect("env config should load");
        assert_eq!(config.auth.access_token.as_deref(), Some("ya29.env"));
        assert_eq!(config.batch.batch_size, 16);
        assert_eq!(config.batch.concurrency, 4);
        assert!((config.retry.jitter_fraction - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.api.page_size, mailsweep_domain::constants::DEFAULT_PAGE_SIZE);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MAILSWEEP_MAX_RETRIES", "lots");
        let result = load_from_env();
        assert!(matches!(result, Err(SweepError::Config { ref message }) if message.contains("MAILSWEEP_MAX_RETRIES")));

        clear_env();
    }

    #[test]
    fn test_env_values_failing_validation() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MAILSWEEP_PAGE_SIZE", "900");
        assert!(matches!(load_from_env(), Err(SweepError::Config { .. })));

        clear_env();
    }

    #[test]
    fn test_load_from_toml_file_with_env_overlay() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let (_file, path) = temp_config(
            "toml",
            r#"
[api]
page_size = 100

[batch]
batch_size = 4
concurrency = 1
inter_batch_delay_ms = 0
"#,
        );
        std::env::set_var("MAILSWEEP_CONCURRENCY", "3");

        let config = load_with(Some(path.clone())).expect("toml config should load");
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.batch.batch_size, 4);
        assert_eq!(config.batch.concurrency, 3);
        assert_eq!(config.batch.inter_batch_delay_ms, 0);

        std::fs::remove_file(path).ok();
        clear_env();
    }

    #[test]
    fn test_load_from_json_file() {
        let (_file, path) =
            temp_config("json", r#"{"retry": {"max_retries": 2, "base_delay_ms": 100}}"#);

        let config = load_from_file(Some(path.clone())).expect("json config should load");
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.base_delay_ms, 100);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_from_file(Some(PathBuf::from("/definitely/not/here.toml")));
        assert!(matches!(result, Err(SweepError::Config { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = parse_config("", Path::new("config.yaml"));
        assert!(matches!(result, Err(SweepError::Config { ref message }) if message.contains("yaml")));
    }

    #[test]
    fn test_invalid_toml_reports_format() {
        let result = parse_config("[api\npage_size = ", Path::new("config.toml"));
        assert!(matches!(result, Err(SweepError::Config { ref message }) if message.contains("TOML")));
    }
}
