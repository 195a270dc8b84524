//! Spritemap configuration module.
//!
//! Handles loading, validating, and merging `spritemap.toml`. Stock defaults
//! are the base layer; the user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [input]
//! directories = ["icons"]      # Walked recursively
//! extensions = ["svg"]         # Case-insensitive
//! allow_duplicates = false     # Keep a file reached twice through overlapping directories
//!
//! [output]
//! filename = "spritemap.svg"   # May contain [contenthash] or [hash]
//! public_path = ""             # URL prefix for fragment addressing
//! optimize = true              # Or a [output.optimize] table
//!
//! [output.svg]
//! sizes = false                # width/height on the root element
//!
//! [output.svg.attributes]      # Extra root attributes, applied last
//!
//! [sprite]
//! prefix = "sprite-"
//! idify = "keep"               # "keep" or "sanitize"
//! gutter = 0
//!
//! [sprite.generate]
//! title = true
//! symbol = true                # true, false, or a postfix string
//! use = false
//! view = false                 # true, false, or a postfix string
//! dimensions = false
//!
//! [styles]                     # Absent = no stylesheet
//! filename = "sprites.scss"    # .css, .scss, .sass or .less
//! format = "data"              # "data" or "fragment"
//!
//! [processing]
//! max_processes = 4            # Omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::optimize::OptimizerConfig;
use crate::styles::StyleLanguage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "spritemap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Spritemap configuration loaded from `spritemap.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpritemapConfig {
    /// Where source SVGs are discovered.
    pub input: InputConfig,
    /// Spritemap file shaping and optimization.
    pub output: OutputConfig,
    /// Per-sprite naming, spacing and element generation.
    pub sprite: SpriteConfig,
    /// Companion stylesheet; `None` disables style generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<StylesConfig>,
    /// Parallel file reading settings.
    pub processing: ProcessingConfig,
}

impl SpritemapConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.filename.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.filename must not be empty".into(),
            ));
        }
        if !self.sprite.gutter.is_finite() || self.sprite.gutter < 0.0 {
            return Err(ConfigError::Validation(
                "sprite.gutter must be a non-negative number".into(),
            ));
        }
        if self.input.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "input.extensions must not be empty".into(),
            ));
        }
        if let OptimizeSetting::Config(optimizer) = &self.output.optimize {
            if optimizer.cleanup_ids {
                return Err(ConfigError::Validation(
                    "output.optimize.cleanup_ids cannot be enabled: sprite ids are referenced by <use> and stylesheets".into(),
                ));
            }
            if optimizer.remove_hidden_elems {
                return Err(ConfigError::Validation(
                    "output.optimize.remove_hidden_elems cannot be enabled: symbols are hidden by definition".into(),
                ));
            }
        }
        if let Some(styles) = &self.styles {
            StyleLanguage::from_filename(&styles.filename)
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
            let names = &styles.variables;
            for (key, value) in [
                ("sprites", &names.sprites),
                ("sizes", &names.sizes),
                ("variables", &names.variables),
                ("mixin", &names.mixin),
            ] {
                if !is_sass_identifier(value) {
                    return Err(ConfigError::Validation(format!(
                        "styles.variables.{key} must be a valid Sass identifier, got {value:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn is_sass_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Source discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Directories walked recursively, relative to the config directory.
    pub directories: Vec<String>,
    /// File extensions treated as sources (case-insensitive, no dot).
    pub extensions: Vec<String>,
    /// Keep files reached more than once through overlapping directories.
    pub allow_duplicates: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directories: vec!["icons".to_string()],
            extensions: vec!["svg".to_string()],
            allow_duplicates: false,
        }
    }
}

/// Spritemap output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Output filename; `[contenthash]` / `[hash]` are replaced by a content hash.
    pub filename: String,
    /// URL prefix under which the spritemap is served (fragment addressing).
    pub public_path: String,
    /// Optimization: `true`/`false` or a table of optimizer passes.
    pub optimize: OptimizeSetting,
    /// Root element shaping.
    pub svg: SvgOutputConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: "spritemap.svg".to_string(),
            public_path: String::new(),
            optimize: OptimizeSetting::Enabled(true),
            svg: SvgOutputConfig::default(),
        }
    }
}

impl OutputConfig {
    /// Whether the filename asks for a content hash.
    pub fn is_hashed(&self) -> bool {
        self.filename.contains("[contenthash]") || self.filename.contains("[hash]")
    }
}

/// `optimize = true` or `[output.optimize]` with individual passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizeSetting {
    Enabled(bool),
    Config(OptimizerConfig),
}

impl OptimizeSetting {
    /// The optimizer configuration to run, or `None` when disabled.
    pub fn resolve(&self) -> Option<OptimizerConfig> {
        match self {
            OptimizeSetting::Enabled(true) => Some(OptimizerConfig::default()),
            OptimizeSetting::Enabled(false) => None,
            OptimizeSetting::Config(config) => Some(config.clone()),
        }
    }
}

/// Root `<svg>` shaping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SvgOutputConfig {
    /// Set root `width` (widest sprite) and `height` (stacked heights plus gutters).
    pub sizes: bool,
    /// Extra root attributes. Applied last, so they override generated ones.
    pub attributes: BTreeMap<String, String>,
}

/// Per-sprite settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    /// Prepended to every sprite identifier.
    pub prefix: String,
    /// How file stems are turned into identifier tokens.
    pub idify: IdifyMode,
    /// Vertical space inserted before every sprite in the stacked layout.
    pub gutter: f64,
    /// Which elements to generate per sprite.
    pub generate: GenerateConfig,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            prefix: "sprite-".to_string(),
            idify: IdifyMode::Keep,
            gutter: 0.0,
            generate: GenerateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdifyMode {
    #[default]
    Keep,
    Sanitize,
}

/// Element generation toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Add a `<title>` to symbols whose source has none.
    pub title: bool,
    pub symbol: Toggle,
    #[serde(rename = "use")]
    pub use_: bool,
    pub view: Toggle,
    /// Copy width/height onto symbols.
    pub dimensions: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            title: true,
            symbol: Toggle::Flag(true),
            use_: false,
            view: Toggle::Flag(false),
            dimensions: false,
        }
    }
}

/// `true`/`false`, or a postfix string appended to the generated id.
///
/// An empty string counts as disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Flag(bool),
    Postfix(String),
}

impl Toggle {
    pub fn is_enabled(&self) -> bool {
        match self {
            Toggle::Flag(enabled) => *enabled,
            Toggle::Postfix(postfix) => !postfix.is_empty(),
        }
    }

    /// Postfix appended to the identifier; empty for `true`.
    pub fn postfix(&self) -> &str {
        match self {
            Toggle::Flag(_) => "",
            Toggle::Postfix(postfix) => postfix,
        }
    }
}

/// Companion stylesheet settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// Target path, relative to the config directory. The extension picks the language.
    pub filename: String,
    /// How rules address sprites.
    pub format: StyleFormat,
    pub attributes: StyleAttributesConfig,
    pub selectors: StyleSelectorsConfig,
    /// Names of the generated Sass maps and mixin.
    pub variables: StyleVariableNames,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            filename: "sprites.scss".to_string(),
            format: StyleFormat::Data,
            attributes: StyleAttributesConfig::default(),
            selectors: StyleSelectorsConfig::default(),
            variables: StyleVariableNames::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleFormat {
    /// Self-contained `data:` URIs.
    #[default]
    Data,
    /// `spritemap.svg#id` URLs; needs view generation.
    Fragment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleAttributesConfig {
    /// Copy symbol attributes onto each single-sprite SVG.
    pub keep: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleSelectorsConfig {
    /// Prefix selectors with the sprite prefix.
    pub prefix: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleVariableNames {
    pub sprites: String,
    pub sizes: String,
    pub variables: String,
    pub mixin: String,
}

impl Default for StyleVariableNames {
    fn default() -> Self {
        Self {
            sprites: "sprites".to_string(),
            sizes: "sizes".to_string(),
            variables: "variables".to_string(),
            mixin: "sprite".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel file readers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SpritemapConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `spritemap.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SpritemapConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SpritemapConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `spritemap.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<SpritemapConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `spritemap.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# SVG Spritemap Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Input discovery
# ---------------------------------------------------------------------------
[input]
# Directories walked recursively for sources, relative to this file.
directories = ["icons"]

# File extensions treated as sources (case-insensitive).
extensions = ["svg"]

# Keep a file that is reached twice through overlapping directories.
allow_duplicates = false

# ---------------------------------------------------------------------------
# Spritemap output
# ---------------------------------------------------------------------------
[output]
# Written into the output directory. [contenthash] or [hash] is replaced by
# the first 12 hex digits of the SHA-256 of the final SVG.
filename = "spritemap.svg"

# URL prefix the spritemap is served under; used by fragment addressing.
public_path = ""

# true, false, or a table of optimizer passes:
#   [output.optimize]
#   remove_comments = true
#   remove_metadata = true
#   collapse_whitespace = true
#   remove_title = true        # kept off while sprite.generate.title is on
#   remove_desc = false
optimize = true

[output.svg]
# Set width/height on the root: widest sprite, stacked heights plus gutters.
sizes = false

# Extra attributes for the root element, applied last.
[output.svg.attributes]
# class = "spritemap"

# ---------------------------------------------------------------------------
# Sprites
# ---------------------------------------------------------------------------
[sprite]
# Prepended to every generated id.
prefix = "sprite-"

# "keep" uses file stems as-is; "sanitize" replaces characters that are not
# valid in ids with "-".
idify = "keep"

# Space inserted before every sprite in the stacked <use>/<view> layout.
gutter = 0

[sprite.generate]
# Add a <title> to symbols whose source has none.
title = true

# true, false, or a postfix string appended to the symbol id.
symbol = true

# Render every symbol with a stacked <use> element.
use = false

# true, false, or a postfix string appended to the view id.
view = false

# Copy width/height onto symbols.
dimensions = false

# ---------------------------------------------------------------------------
# Stylesheet (disabled unless this section is present)
# ---------------------------------------------------------------------------
# [styles]
# The extension selects the language: .css, .scss, .sass or .less
# filename = "sprites.scss"
#
# "data" embeds each sprite as a data URI; "fragment" points at
# spritemap.svg#<id> and needs sprite.generate.view.
# format = "data"
#
# [styles.attributes]
# keep = false
#
# [styles.selectors]
# prefix = false
#
# [styles.variables]
# sprites = "sprites"
# sizes = "sizes"
# variables = "variables"
# mixin = "sprite"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel file readers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
