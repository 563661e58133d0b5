//! Settings for the Arcana surfaces
//!
//! One TOML file, `$XDG_CONFIG_HOME/arcana/arcana.toml` (usually
//! `~/.config/arcana/arcana.toml`), tunes the reading server connection and
//! the two carousels. Later layers win:
//!
//! 1. built-in defaults
//! 2. the TOML file, if present
//! 3. `ARCANA_API_URL` / `ARCANA_API_TIMEOUT`
//! 4. command-line flags, via [`ConfigOverrides`]
//!
//! ```toml
//! [api]
//! url = "http://localhost:5000"
//! timeout_secs = 120
//!
//! [wheel]
//! spacing = 90.0
//! window = 20
//!
//! [reviewer]
//! spacing = 90.0
//! window = 10
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::carousel::CarouselConfig;

/// Default reading server address
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default request timeout; interpretations stream for a while
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;

/// Largest `window` a carousel section accepts
pub const MAX_WINDOW: usize = 256;

/// Environment variable overriding `api.url`
pub const ENV_API_URL: &str = "ARCANA_API_URL";

/// Environment variable overriding `api.timeout_secs`
pub const ENV_API_TIMEOUT: &str = "ARCANA_API_TIMEOUT";

// =============================================================================
// Errors
// =============================================================================

/// Why a configuration could not be produced
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        /// File that failed
        path: PathBuf,
        /// I/O cause
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("bad config file: {0}")]
    Syntax(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Which layer last changed the configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// Nothing was overridden
    Default,
    /// The TOML file
    File,
    /// `ARCANA_*` variables
    Env,
    /// Command-line flags
    Cli,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Default => "built-in defaults",
            Self::File => "config file",
            Self::Env => "environment",
            Self::Cli => "command line",
        })
    }
}

// =============================================================================
// File Schema
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileLayer {
    api: ApiLayer,
    wheel: CarouselLayer,
    reviewer: CarouselLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ApiLayer {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CarouselLayer {
    spacing: Option<f64>,
    window: Option<usize>,
}

impl CarouselLayer {
    // Spacing is taken raw so validation can name a bad value
    fn merge_into(&self, carousel: &mut CarouselConfig) {
        if let Some(spacing) = self.spacing {
            carousel.spacing = spacing;
        }
        if let Some(window) = self.window {
            carousel.window = window;
        }
    }
}

// =============================================================================
// Resolved Settings
// =============================================================================

/// Reading server connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:5000`
    pub url: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Everything the surfaces need to start
#[derive(Clone, Debug)]
pub struct ArcanaConfig {
    /// Reading server
    pub api: ApiConfig,
    /// Circular selection wheel
    pub wheel: CarouselConfig,
    /// Clamped reviewer
    pub reviewer: CarouselConfig,
    /// The TOML file that contributed values, if one did
    pub loaded_from: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for ArcanaConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            wheel: CarouselConfig::wheel(),
            reviewer: CarouselConfig::reviewer(),
            loaded_from: None,
            source: ConfigSource::Default,
        }
    }
}

impl ArcanaConfig {
    /// Built-in defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The highest-priority layer that set a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Reject settings the surfaces cannot run with
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a blank URL, a zero timeout, a spacing
    /// that is not a positive finite number, or a window outside
    /// `1..=MAX_WINDOW`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.url is empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be at least 1".into()));
        }
        for (section, carousel) in [("wheel", &self.wheel), ("reviewer", &self.reviewer)] {
            if !(carousel.spacing.is_finite() && carousel.spacing > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{section}.spacing must be positive, got {}",
                    carousel.spacing
                )));
            }
            if !(1..=MAX_WINDOW).contains(&carousel.window) {
                return Err(ConfigError::Invalid(format!(
                    "{section}.window must be between 1 and {MAX_WINDOW}, got {}",
                    carousel.window
                )));
            }
        }
        Ok(())
    }

    fn merge_file(&mut self, layer: &FileLayer, path: &Path) {
        if let Some(url) = &layer.api.url {
            self.api.url.clone_from(url);
        }
        if let Some(secs) = layer.api.timeout_secs {
            self.api.timeout_secs = secs;
        }
        layer.wheel.merge_into(&mut self.wheel);
        layer.reviewer.merge_into(&mut self.reviewer);
        self.loaded_from = Some(path.to_path_buf());
        self.source = ConfigSource::File;
    }

    // Blank or unparsable variables are skipped
    fn merge_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(url) = env(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api.url = url;
            self.source = ConfigSource::Env;
        }
        if let Some(secs) = env(ENV_API_TIMEOUT).and_then(|t| t.trim().parse().ok()) {
            self.api.timeout_secs = secs;
            self.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// `arcana/arcana.toml` under the platform config directory
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("arcana").join("arcana.toml"))
}

/// Defaults, then the default file, then the environment
///
/// # Errors
///
/// See [`load_config_with_env`].
pub fn load_config() -> Result<ArcanaConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Like [`load_config`] with an explicit file; `None` skips the file layer
///
/// # Errors
///
/// See [`load_config_with_env`].
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ArcanaConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Build the configuration, reading variables through `env`
///
/// A file that does not exist is skipped.
///
/// # Errors
///
/// [`ConfigError::Unreadable`] or [`ConfigError::Syntax`] for a file that
/// exists but cannot be used, and [`ConfigError::Invalid`] when the merged
/// result fails [`ArcanaConfig::validate`].
pub fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ArcanaConfig, ConfigError> {
    let mut config = ArcanaConfig::default();

    if let Some(path) = path {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let layer: FileLayer = toml::from_str(&text)?;
                config.merge_file(&layer, &path);
                tracing::info!(path = %path.display(), "Config file applied");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file");
            }
            Err(source) => return Err(ConfigError::Unreadable { path, source }),
        }
    }

    config.merge_env(env);
    config.validate()?;
    Ok(config)
}

// =============================================================================
// Command-Line Layer
// =============================================================================

/// Values from command-line flags, applied last
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// `--api-url`
    pub api_url: Option<String>,
    /// `--timeout`
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// No flags given
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the server URL
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Override the timeout
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Write the flags into `config` and re-validate
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if a flag is out of range.
    pub fn apply(&self, config: &mut ArcanaConfig) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            config.api.url.clone_from(url);
            config.source = ConfigSource::Cli;
        }
        if let Some(secs) = self.timeout_secs {
            config.api.timeout_secs = secs;
            config.source = ConfigSource::Cli;
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn load(file: &NamedTempFile) -> Result<ArcanaConfig, ConfigError> {
        load_config_with_env(Some(file.path().to_path_buf()), no_env)
    }

    #[test]
    fn test_defaults() {
        let config = ArcanaConfig::default();
        assert_eq!(config.api.url, "http://localhost:5000");
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.wheel.window, 20);
        assert_eq!(config.reviewer.window, 10);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_path_ends_in_arcana_toml() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("arcana/arcana.toml"));
        }
    }

    #[test]
    fn test_file_sets_sections() {
        let file = toml_file(
            r#"
[api]
url = "https://tarot.example"
timeout_secs = 30

[wheel]
spacing = 72.0
window = 12

[reviewer]
window = 4
"#,
        );

        let config = load(&file).unwrap();

        assert_eq!(config.api.url, "https://tarot.example");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.wheel.spacing, 72.0);
        assert_eq!(config.wheel.window, 12);
        assert_eq!(config.reviewer.window, 4);
        assert_eq!(config.reviewer.spacing, 90.0);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.loaded_from.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = load(&toml_file("")).unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_absent_file_is_skipped() {
        let path = PathBuf::from("/nonexistent/arcana/arcana.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.loaded_from.is_none());
    }

    #[test]
    fn test_broken_files_are_errors() {
        for text in ["[api\nurl = 3", "[api]\ntimeout_secs = \"soon\"\n", "[deck]\nsize = 3\n"] {
            let result = load(&toml_file(text));
            assert!(matches!(result, Err(ConfigError::Syntax(_))), "{text:?}");
        }
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let result = load(&toml_file("[reviewer]\nspacing = 0.0\n"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = load(&toml_file("[api]\ntimeout_secs = 0\n"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_window_must_fit() {
        // Beyond i64 the TOML parser already refuses it
        let result = load(&toml_file("[reviewer]\nwindow = 18446744073709551615\n"));
        assert!(matches!(result, Err(ConfigError::Syntax(_))));

        for text in [
            "[reviewer]\nwindow = 9223372036854775807\n",
            "[wheel]\nwindow = 2000000000\n",
            "[wheel]\nwindow = 0\n",
        ] {
            let result = load(&toml_file(text));
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "{text:?}");
        }

        let config = load(&toml_file("[reviewer]\nwindow = 256\n")).unwrap();
        assert_eq!(config.reviewer.window, MAX_WINDOW);
    }

    #[test]
    fn test_env_beats_file() {
        let file = toml_file("[api]\nurl = \"http://file:1\"\ntimeout_secs = 5\n");
        let vars = HashMap::from([(ENV_API_URL, "http://env:2"), (ENV_API_TIMEOUT, "soon")]);

        let config = load_config_with_env(Some(file.path().to_path_buf()), |key| {
            vars.get(key).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.api.url, "http://env:2");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_flags_beat_env() {
        let mut config = load_config_with_env(None, |key| {
            (key == ENV_API_URL).then(|| "http://env:2".to_string())
        })
        .unwrap();

        ConfigOverrides::new()
            .with_api_url("http://cli:3")
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.api.url, "http://cli:3");
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_no_flags_leave_source_alone() {
        let mut config = ArcanaConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_zero_timeout_flag_rejected() {
        let mut config = ArcanaConfig::default();
        let result = ConfigOverrides::new().with_timeout_secs(0).apply(&mut config);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_source_names() {
        assert_eq!(ConfigSource::Default.to_string(), "built-in defaults");
        assert_eq!(ConfigSource::Cli.to_string(), "command line");
    }
}
