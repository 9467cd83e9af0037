//! TOML Configuration File Support
//!
//! Widget defaults and loop timing, loaded from an optional TOML file and
//! `TESSERA_*` environment variables.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`], applied by the caller)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [menu]
//! input_delay_ms = 200
//!
//! [scroll_bar]
//! track = "#808080"
//! thumb = "#ffffff"
//! glyph = "#"
//!
//! [animation]
//! default_fps = 10.0
//!
//! [dispatcher]
//! max_passes = 16
//!
//! [terminal]
//! fps = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::Color;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Menu section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuToml {
    /// Minimum time between keyboard transitions in milliseconds
    pub input_delay_ms: Option<u64>,
}

/// Scroll bar section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollBarToml {
    /// Color of unlit cells, as `#rrggbb` or `#rrggbbaa`
    pub track: Option<String>,

    /// Color of lit cells
    pub thumb: Option<String>,

    /// Character drawn in every cell
    pub glyph: Option<char>,
}

/// Animation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Frame rate for animations that do not specify one
    pub default_fps: Option<f64>,
}

/// Dispatcher section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherToml {
    /// Follow-up drain passes per tick before leftovers wait for the next one
    pub max_passes: Option<usize>,
}

/// Terminal section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalToml {
    /// Target ticks per second of the main loop
    pub fps: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Menu configuration section
    pub menu: MenuToml,

    /// Scroll bar configuration section
    pub scroll_bar: ScrollBarToml,

    /// Animation configuration section
    pub animation: AnimationToml,

    /// Dispatcher configuration section
    pub dispatcher: DispatcherToml,

    /// Terminal configuration section
    pub terminal: TerminalToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Menu defaults
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuConfig {
    /// Minimum time between keyboard transitions in milliseconds
    pub input_delay_ms: u64,
}

impl MenuConfig {
    /// Input delay as a duration
    #[must_use]
    pub const fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self { input_delay_ms: 200 }
    }
}

/// Scroll bar look
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollBarConfig {
    /// Color of unlit cells
    pub track: Color,
    /// Color of lit cells
    pub thumb: Color,
    /// Character drawn in every cell
    pub glyph: char,
}

impl Default for ScrollBarConfig {
    fn default() -> Self {
        Self {
            track: Color::GRAY,
            thumb: Color::WHITE,
            glyph: '#',
        }
    }
}

/// Animation defaults
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Frame rate for animations that do not specify one
    pub default_fps: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { default_fps: 10.0 }
    }
}

/// Dispatcher limits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Follow-up drain passes per tick
    pub max_passes: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { max_passes: 16 }
    }
}

/// Main loop timing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalConfig {
    /// Target ticks per second
    pub fps: u32,
}

impl TerminalConfig {
    /// Time between ticks at the target rate
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { fps: 30 }
    }
}

/// Centralized engine configuration
///
/// Consolidates defaults, file and environment values, and tracks where the
/// last override came from. Use [`load_config_from_path`] to load with
/// proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    /// Menu defaults
    pub menu: MenuConfig,

    /// Scroll bar look
    pub scroll_bar: ScrollBarConfig,

    /// Animation defaults
    pub animation: AnimationConfig,

    /// Dispatcher limits
    pub dispatcher: DispatcherConfig,

    /// Main loop timing
    pub terminal: TerminalConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl EngineConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject values the engine cannot run with
    ///
    /// # Errors
    ///
    /// [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.animation.default_fps.is_finite() || self.animation.default_fps <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "animation.default_fps must be positive, got {}",
                self.animation.default_fps
            )));
        }
        if self.dispatcher.max_passes == 0 {
            return Err(ConfigError::ValidationError(
                "dispatcher.max_passes must be at least 1".to_string(),
            ));
        }
        if self.terminal.fps == 0 {
            return Err(ConfigError::ValidationError(
                "terminal.fps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if any resulting value is invalid. A missing file is not an error.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config_from_path`], reading variables through `lookup`
///
/// # Errors
///
/// See [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Start with defaults
    let mut config = EngineConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_config = read_toml(config_path)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Environment overrides file values
    apply_env(&mut config, lookup)?;
    config.validate()?;

    Ok(config)
}

fn read_toml(path: &Path) -> Result<EngineToml, ConfigError> {
    let toml_content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&toml_content)?)
}

fn parse_color(key: &str, value: &str) -> Result<Color, ConfigError> {
    Color::from_hex(value).ok_or_else(|| {
        ConfigError::ValidationError(format!("{key}: '{value}' is not a #rrggbb[aa] color"))
    })
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut EngineConfig, toml: &EngineToml) -> Result<(), ConfigError> {
    if let Some(delay) = toml.menu.input_delay_ms {
        config.menu.input_delay_ms = delay;
    }

    if let Some(ref track) = toml.scroll_bar.track {
        config.scroll_bar.track = parse_color("scroll_bar.track", track)?;
    }
    if let Some(ref thumb) = toml.scroll_bar.thumb {
        config.scroll_bar.thumb = parse_color("scroll_bar.thumb", thumb)?;
    }
    if let Some(glyph) = toml.scroll_bar.glyph {
        config.scroll_bar.glyph = glyph;
    }

    if let Some(fps) = toml.animation.default_fps {
        config.animation.default_fps = fps;
    }
    if let Some(passes) = toml.dispatcher.max_passes {
        config.dispatcher.max_passes = passes;
    }
    if let Some(fps) = toml.terminal.fps {
        config.terminal.fps = fps;
    }
    Ok(())
}

/// Apply `TESSERA_*` overrides read through `lookup`
///
/// Numeric variables that fail to parse are ignored, matching the rest of
/// the loader; colors that fail to parse are an error because there is no
/// sensible fallback.
///
/// # Errors
///
/// [`ConfigError::ValidationError`] for a malformed color.
pub fn apply_env<F>(config: &mut EngineConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(delay) = lookup("TESSERA_MENU_INPUT_DELAY_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.menu.input_delay_ms = ms;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(track) = lookup("TESSERA_SCROLL_BAR_TRACK") {
        config.scroll_bar.track = parse_color("TESSERA_SCROLL_BAR_TRACK", &track)?;
        config.source = ConfigSource::Env;
    }
    if let Some(thumb) = lookup("TESSERA_SCROLL_BAR_THUMB") {
        config.scroll_bar.thumb = parse_color("TESSERA_SCROLL_BAR_THUMB", &thumb)?;
        config.source = ConfigSource::Env;
    }
    if let Some(fps) = lookup("TESSERA_ANIMATION_FPS") {
        if let Ok(fps) = fps.parse::<f64>() {
            config.animation.default_fps = fps;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(passes) = lookup("TESSERA_DISPATCHER_MAX_PASSES") {
        if let Ok(n) = passes.parse::<usize>() {
            config.dispatcher.max_passes = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(fps) = lookup("TESSERA_FPS") {
        if let Ok(fps) = fps.parse::<u32>() {
            config.terminal.fps = fps;
            config.source = ConfigSource::Env;
        }
    }
    Ok(())
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Command-line overrides, applied after file and environment
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Target ticks per second
    pub fps: Option<u32>,

    /// Menu input delay in milliseconds
    pub input_delay_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target fps override
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Set menu input delay override
    #[must_use]
    pub fn with_input_delay_ms(mut self, ms: u64) -> Self {
        self.input_delay_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut EngineConfig) {
        if self.fps.is_some() || self.input_delay_ms.is_some() {
            config.source = ConfigSource::Cli;
        }
        if let Some(fps) = self.fps {
            config.terminal.fps = fps;
        }
        if let Some(ms) = self.input_delay_ms {
            config.menu.input_delay_ms = ms;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.menu.input_delay(), Duration::from_millis(200));
        assert_eq!(config.scroll_bar.glyph, '#');
        assert_eq!(config.scroll_bar.track, Color::GRAY);
        assert!((config.animation.default_fps - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.dispatcher.max_passes, 16);
        assert_eq!(config.terminal.fps, 30);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tick_interval() {
        let terminal = TerminalConfig { fps: 50 };
        assert_eq!(terminal.tick_interval(), Duration::from_millis(20));
    }

    // =========================================================================
    // File Loading Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_config(
            r##"
[menu]
input_delay_ms = 150

[scroll_bar]
track = "#102030"
thumb = "#ffffff80"
glyph = "|"

[animation]
default_fps = 24.0

[dispatcher]
max_passes = 4

[terminal]
fps = 60
"##,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.menu.input_delay_ms, 150);
        assert_eq!(config.scroll_bar.track, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(config.scroll_bar.thumb, Color::rgba(0xff, 0xff, 0xff, 0x80));
        assert_eq!(config.scroll_bar.glyph, '|');
        assert!((config.animation.default_fps - 24.0).abs() < f64::EPSILON);
        assert_eq!(config.dispatcher.max_passes, 4);
        assert_eq!(config.terminal.fps, 60);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_config("[terminal]\nfps = 12\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.terminal.fps, 12);
        assert_eq!(config.menu.input_delay_ms, 200);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/tessera/config.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_config("[menu\ninput_delay_ms = \"soon\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[scroll_bar]\ntrack = \"grey\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let file = write_config("[terminal]\nfps = 0\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[menu]\ninput_delay_ms = 150\n[terminal]\nfps = 60\n");
        let env: HashMap<&str, &str> = [
            ("TESSERA_MENU_INPUT_DELAY_MS", "80"),
            ("TESSERA_SCROLL_BAR_THUMB", "#00ff00"),
            ("TESSERA_FPS", "not a number"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |key| {
            env.get(key).map(ToString::to_string)
        })
        .unwrap();

        assert_eq!(config.menu.input_delay_ms, 80);
        assert_eq!(config.scroll_bar.thumb, Color::rgb(0, 255, 0));
        // unparseable number leaves the file value
        assert_eq!(config.terminal.fps, 60);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = EngineConfig::default();
        config.menu.input_delay_ms = 80;
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new().with_input_delay_ms(0).apply(&mut config);

        assert_eq!(config.menu.input_delay_ms, 0);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = EngineConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.terminal.fps, 30);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ValidationError("terminal.fps must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: terminal.fps must be at least 1"
        );
    }
}
