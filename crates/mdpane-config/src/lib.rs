//! Configuration management for mdpane.
//!
//! Parses `mdpane.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.kroki_url`
//! - `state.dir` (also expands a leading `~`)

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::expand::{Expansion, expand};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override the directory holding persisted session state.
    pub state_dir: Option<PathBuf>,
    /// Override the auto-save flag.
    pub auto_save: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpane.toml";

/// Default quiet period before an auto-save fires.
const DEFAULT_AUTO_SAVE_DELAY_MS: u64 = 1000;

/// Default bound on the recent files list.
const DEFAULT_MAX_RECENT_FILES: usize = 10;

/// Default HTTP timeout for Kroki requests.
const DEFAULT_DIAGRAM_TIMEOUT_SECS: u64 = 30;

/// Default number of rendered diagrams kept in memory.
const DEFAULT_DIAGRAM_CACHE_SIZE: usize = 256;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing behaviour.
    pub editor: EditorConfig,
    /// Preview rendering.
    pub preview: PreviewConfig,
    /// Diagram rendering configuration (paths/urls as raw strings).
    diagrams: DiagramsConfigRaw,
    /// Session state location (raw string from TOML).
    state: StateConfigRaw,

    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Resolved state configuration (set after loading).
    #[serde(skip)]
    pub state_resolved: StateConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Editing behaviour.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Whether edits are written back automatically after a quiet period.
    pub auto_save: bool,
    /// Quiet period in milliseconds.
    pub auto_save_delay_ms: u64,
    /// Maximum number of recent files to remember.
    pub max_recent_files: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            auto_save: true,
            auto_save_delay_ms: DEFAULT_AUTO_SAVE_DELAY_MS,
            max_recent_files: DEFAULT_MAX_RECENT_FILES,
        }
    }
}

impl EditorConfig {
    /// Quiet period as a [`Duration`].
    #[must_use]
    pub fn auto_save_delay(&self) -> Duration {
        Duration::from_millis(self.auto_save_delay_ms)
    }
}

/// Preview rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Fence language that marks a diagram block.
    pub diagram_keyword: String,
    /// Whether code blocks are syntax highlighted.
    pub highlight: bool,
    /// Highlighting theme name.
    pub theme: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            diagram_keyword: "mermaid".to_owned(),
            highlight: true,
            theme: "InspiredGitHub".to_owned(),
        }
    }
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    kroki_url: Option<String>,
    timeout_secs: Option<u64>,
    cache_size: Option<usize>,
}

/// Resolved diagram rendering configuration.
#[derive(Debug)]
pub struct DiagramsConfig {
    /// Kroki server URL. `None` disables network rendering.
    pub kroki_url: Option<String>,
    /// HTTP timeout for Kroki requests.
    pub timeout: Duration,
    /// Rendered diagrams kept in memory. `0` disables caching.
    pub cache_size: usize,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: None,
            timeout: Duration::from_secs(DEFAULT_DIAGRAM_TIMEOUT_SECS),
            cache_size: DEFAULT_DIAGRAM_CACHE_SIZE,
        }
    }
}

/// Raw state configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StateConfigRaw {
    dir: Option<String>,
}

/// Resolved state configuration with absolute paths.
#[derive(Debug, Default)]
pub struct StateConfig {
    /// Directory holding `state.json` (last file, recent files).
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdpane.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams_resolved.kroki_url = Some(kroki_url.clone());
        }
        if let Some(state_dir) = &settings.state_dir {
            self.state_resolved.dir.clone_from(state_dir);
        }
        if let Some(auto_save) = settings.auto_save {
            self.editor.auto_save = auto_save;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            editor: EditorConfig::default(),
            preview: PreviewConfig::default(),
            diagrams: DiagramsConfigRaw::default(),
            state: StateConfigRaw::default(),
            diagrams_resolved: DiagramsConfig::default(),
            state_resolved: StateConfig {
                dir: base.join(".mdpane"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file and after applying CLI settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_editor()?;
        self.validate_preview()?;
        self.validate_diagrams()?;
        Ok(())
    }

    /// Validate editor configuration.
    fn validate_editor(&self) -> Result<(), ConfigError> {
        const MAX_DELAY_MS: u64 = 60_000;
        const MAX_RECENT: usize = 100;

        let delay = self.editor.auto_save_delay_ms;
        if delay == 0 || delay > MAX_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "editor.auto_save_delay_ms must be between 1 and {MAX_DELAY_MS}"
            )));
        }

        let max_recent = self.editor.max_recent_files;
        if max_recent == 0 || max_recent > MAX_RECENT {
            return Err(ConfigError::Validation(format!(
                "editor.max_recent_files must be between 1 and {MAX_RECENT}"
            )));
        }

        Ok(())
    }

    /// Validate preview configuration.
    fn validate_preview(&self) -> Result<(), ConfigError> {
        let keyword = &self.preview.diagram_keyword;
        require_non_empty(keyword, "preview.diagram_keyword")?;
        if keyword.chars().any(|c| c.is_whitespace() || c == '`' || c == '~') {
            return Err(ConfigError::Validation(
                "preview.diagram_keyword must be a single word".to_owned(),
            ));
        }
        require_non_empty(&self.preview.theme, "preview.theme")?;
        Ok(())
    }

    /// Validate diagrams configuration.
    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        if let Some(ref kroki_url) = self.diagrams_resolved.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }

        if self.diagrams_resolved.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.diagrams.kroki_url {
            self.diagrams.kroki_url = Some(expand(url, "diagrams.kroki_url", Expansion::Env)?);
        }
        if let Some(ref dir) = self.state.dir {
            self.state.dir = Some(expand(dir, "state.dir", Expansion::Path)?);
        }
        Ok(())
    }

    /// Resolve raw sections against the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        self.diagrams_resolved = DiagramsConfig {
            kroki_url: self.diagrams.kroki_url.clone(),
            timeout: Duration::from_secs(
                self.diagrams
                    .timeout_secs
                    .unwrap_or(DEFAULT_DIAGRAM_TIMEOUT_SECS),
            ),
            cache_size: self
                .diagrams
                .cache_size
                .unwrap_or(DEFAULT_DIAGRAM_CACHE_SIZE),
        };

        self.state_resolved = StateConfig {
            dir: config_dir.join(self.state.dir.as_deref().unwrap_or(".mdpane")),
        };
    }
}
