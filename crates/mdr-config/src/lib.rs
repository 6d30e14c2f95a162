//! Configuration management for mdr.
//!
//! Parses `mdr.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [render]
//! admonition_icons = false
//!
//! [components]
//! inline-code = "kbd"
//! "table.td" = "cell"
//!
//! [output]
//! dir = "build"
//! extension = "html"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override admonition icons flag.
    pub admonition_icons: Option<bool>,
    /// Extra component aliases, applied on top of `[components]`.
    pub components: Vec<(String, String)>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "mdr.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default renderer options.
    pub render: RenderConfig,
    /// Component aliases (tag or `parent.tag` → target tag).
    pub components: BTreeMap<String, String>,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Options of the default renderers.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render kind icons in admonition headings.
    pub admonition_icons: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            admonition_icons: true,
        }
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    extension: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory for rendered pages. `None` writes to stdout.
    pub dir: Option<PathBuf>,
    /// File extension of rendered pages, without the dot.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extension: "html".to_owned(),
        }
    }
}

impl OutputConfig {
    /// Output file for a page stem, or `None` when writing to stdout.
    #[must_use]
    pub fn page_path(&self, stem: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{stem}.{}", self.extension)))
    }
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
}

/// Require a string field to be non-blank.
fn require_non_blank(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdr.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result is invalid.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir = Some(output_dir.clone());
        }
        if let Some(admonition_icons) = settings.admonition_icons {
            self.render.admonition_icons = admonition_icons;
        }
        for (tag, alias) in &settings.components {
            self.components.insert(tag.clone(), alias.clone());
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a component alias has a blank key
    /// or target, aliases a tag to itself, or the output extension is blank
    /// or starts with a dot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_components()?;
        self.validate_output()?;
        Ok(())
    }

    fn validate_components(&self) -> Result<(), ConfigError> {
        for (tag, alias) in &self.components {
            require_non_blank(tag, "components key")?;
            require_non_blank(alias, &format!("components.{tag}"))?;
            let plain = tag.rsplit_once('.').map_or(tag.as_str(), |(_, plain)| plain);
            if alias == tag || alias == plain {
                return Err(ConfigError::Validation(format!(
                    "components.{tag} cannot alias a tag to itself"
                )));
            }
        }
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        let extension = &self.output_resolved.extension;
        require_non_blank(extension, "output.extension")?;
        if extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "output.extension must not start with a dot".to_owned(),
            ));
        }
        Ok(())
    }

    /// Resolve the output directory against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = OutputConfig::default();
        self.output_resolved = OutputConfig {
            dir: self.output.dir.as_deref().map(|dir| config_dir.join(dir)),
            extension: self.output.extension.clone().unwrap_or(defaults.extension),
        };
    }
}
