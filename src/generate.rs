//! One generation pass: sources in, spritemap + stylesheet + warnings out.
//!
//! ## Pipeline
//!
//! ```text
//! sources ─► option checks ─► assemble ─┬─► styles (from the assembled symbols)
//!                                       └─► clean ─► optimize ─► strip variables ─► hash filename
//! ```
//!
//! Stylesheets are generated before the bookkeeping attributes are removed,
//! and both consumers read the same assembled document. Every step is
//! deterministic: the same sources and configuration give byte-identical
//! output, so callers can skip writing when nothing changed.
//!
//! ## Warnings
//!
//! Nothing in the pass aborts because of a single sprite. Per-sprite
//! problems and suspicious option combinations become [`Warning`]s, in the
//! order they were found:
//!
//! - option checks (view without use, collisions, variables the target
//!   stylesheet cannot express, fragment addressing pitfalls)
//! - assembly (skipped sprites, duplicate identifiers)
//! - stylesheet (variable default mismatches)
//!
//! Only configuration errors are fatal: an unsupported stylesheet extension,
//! or a custom optimizer that fails.
//!
//! ## Hooks
//!
//! The TOML config can only express constant naming. [`Hooks`] lets library
//! callers plug in functions for the prefix and idify strategies, post-process
//! the stylesheet text, and swap the optimizer.

use crate::config::{IdifyMode, SpritemapConfig, StyleFormat};
use crate::naming::{Idify, Prefix, SpriteNaming};
use crate::optimize::{self, Minifier, OptimizeError, Optimizer};
use crate::spritemap::{AssembleOptions, assemble};
use crate::styles::{self, StyleContext, StyleError, StyleLanguage};
use crate::types::{Source, Warning, WarningKind};
use crate::variables::{add_variables_namespace, has_variables, strip_variables};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Number of hex digits of the SHA-256 used in hashed filenames.
pub const CONTENT_HASH_LENGTH: usize = 12;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Style error: {0}")]
    Style(#[from] StyleError),
    #[error("Optimize error: {0}")]
    Optimize(#[from] OptimizeError),
}

/// Post-processor for generated stylesheet text.
pub type StyleCallback = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Caller-supplied strategies that override or extend the configuration.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Replaces `sprite.prefix`.
    pub prefix: Option<Prefix>,
    /// Replaces `sprite.idify`.
    pub idify: Option<Idify>,
    pub styles_callback: Option<StyleCallback>,
    /// Replaces the built-in [`Minifier`].
    pub optimizer: Option<Arc<dyn Optimizer>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("prefix", &self.prefix)
            .field("idify", &self.idify)
            .field("styles_callback", &self.styles_callback.is_some())
            .field("optimizer", &self.optimizer.is_some())
            .finish()
    }
}

/// Result of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    /// Final spritemap text, optimized and free of `var:` syntax.
    pub svg: String,
    /// Spritemap filename with any content hash filled in.
    pub filename: String,
    pub styles: Option<GeneratedStyles>,
    pub sprites: Vec<SpriteSummary>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedStyles {
    /// Target path, as configured.
    pub filename: String,
    pub text: String,
}

/// A placed sprite, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SpriteSummary {
    pub identifier: String,
    pub location: String,
    pub width: f64,
    pub height: f64,
    pub y: f64,
}

/// Build the naming strategies from config, with hooks taking precedence.
pub fn sprite_naming(config: &SpritemapConfig, hooks: &Hooks) -> SpriteNaming {
    let prefix = hooks
        .prefix
        .clone()
        .unwrap_or_else(|| Prefix::Fixed(config.sprite.prefix.clone()));
    let idify = hooks.idify.clone().unwrap_or(match config.sprite.idify {
        IdifyMode::Keep => Idify::Keep,
        IdifyMode::Sanitize => Idify::Sanitize,
    });
    SpriteNaming::new(prefix, idify)
}

/// Pass-level warnings about option combinations.
///
/// Each condition is reported at most once per pass, however many sprites
/// it affects.
pub fn option_warnings(config: &SpritemapConfig, sources: &[Source]) -> Vec<Warning> {
    let generate = &config.sprite.generate;
    let symbol = generate.symbol.is_enabled();
    let view = generate.view.is_enabled();
    let mut warnings = Vec::new();
    let mut incompatible = |message: &str| {
        warnings.push(Warning::new(WarningKind::IncompatibleOptions, message));
    };

    if view && !generate.use_ {
        incompatible("sprite.generate.view is enabled without sprite.generate.use; views will point at empty regions");
    }
    if generate.use_ && !symbol {
        incompatible("sprite.generate.use is enabled without sprite.generate.symbol; <use> elements will reference missing symbols");
    }
    if generate.title && !symbol {
        incompatible("sprite.generate.title has no effect without sprite.generate.symbol");
    }
    if symbol && view && generate.symbol.postfix() == generate.view.postfix() {
        warnings.push(Warning::new(
            WarningKind::IdentifierCollision,
            "sprite.generate.symbol and sprite.generate.view produce the same ids; give one of them a postfix",
        ));
    }

    let Some(styles) = &config.styles else {
        return warnings;
    };
    let uses_variables = has_variables(&sources.iter().map(|s| &s.content).collect::<Vec<_>>());
    if uses_variables {
        let supported = StyleLanguage::from_filename(&styles.filename)
            .map(|language| language.supports_variables())
            .unwrap_or(true);
        if !supported {
            warnings.push(Warning::new(
                WarningKind::VariablesUnsupported,
                format!(
                    "Sprites use variables but '{}' is not a Sass stylesheet; default values are used",
                    styles.filename
                ),
            ));
        }
        if styles.format == StyleFormat::Fragment {
            warnings.push(Warning::new(
                WarningKind::VariablesWithFragment,
                "Sprites use variables but styles.format is \"fragment\"; default values are used",
            ));
        }
    }
    if styles.format == StyleFormat::Fragment {
        if !view {
            warnings.push(Warning::new(
                WarningKind::FragmentWithoutView,
                "styles.format is \"fragment\" but sprite.generate.view is disabled; fragment URLs will not resolve",
            ));
        }
        if config.output.is_hashed() {
            warnings.push(Warning::new(
                WarningKind::FragmentWithHashedFilename,
                format!(
                    "styles.format is \"fragment\" but output.filename '{}' is hashed; stylesheet URLs use the unhashed name",
                    config.output.filename
                ),
            ));
        }
    }
    warnings
}

/// Run one generation pass.
///
/// Returns `Ok(None)` when there are no sources: nothing to emit, and
/// nothing to warn about.
pub fn generate(
    sources: &[Source],
    config: &SpritemapConfig,
    hooks: &Hooks,
) -> Result<Option<Generated>, GenerateError> {
    if sources.is_empty() {
        return Ok(None);
    }
    let mut warnings = option_warnings(config, sources);
    let naming = sprite_naming(config, hooks);

    let (spritemap, assembly_warnings) =
        assemble(sources, &AssembleOptions::from_config(config, naming.clone()));
    warnings.extend(assembly_warnings);
    let Some(spritemap) = spritemap else {
        return Ok(None);
    };
    tracing::info!(
        sources = sources.len(),
        sprites = spritemap.sprites.len(),
        "assembled spritemap"
    );

    let styles = match &config.styles {
        Some(styles_config) => {
            let language = StyleLanguage::from_filename(&styles_config.filename)?;
            let context = StyleContext {
                config: styles_config,
                naming: &naming,
                public_path: &config.output.public_path,
                spritemap_filename: &config.output.filename,
                view_postfix: config.sprite.generate.view.postfix(),
            };
            let symbols = styles::symbols_from_spritemap(&spritemap);
            let output = styles::format_styles(language, &symbols, &context);
            warnings.extend(output.warnings);
            let text = match &hooks.styles_callback {
                Some(callback) => callback(&output.text),
                None => output.text,
            };
            Some(GeneratedStyles {
                filename: styles_config.filename.clone(),
                text,
            })
        }
        None => None,
    };

    let mut svg = optimize::clean_svg(&spritemap.to_svg_string());
    if spritemap.has_variables {
        svg = add_variables_namespace(&svg).into_owned();
    }
    let optimizer: &dyn Optimizer = match &hooks.optimizer {
        Some(custom) => custom.as_ref(),
        None => &Minifier,
    };
    let optimizer_config = config.output.optimize.resolve();
    let svg = optimize::optimize_svg(
        &svg,
        optimizer_config.as_ref(),
        config.sprite.generate.title,
        optimizer,
    )?;
    let svg = strip_variables(&svg);
    let filename = hashed_filename(&config.output.filename, &svg);

    let sprites = spritemap
        .sprites
        .iter()
        .map(|sprite| SpriteSummary {
            identifier: sprite.item.identifier.clone(),
            location: sprite.item.location.clone(),
            width: sprite.geometry.width,
            height: sprite.geometry.height,
            y: sprite.y,
        })
        .collect();

    Ok(Some(Generated {
        svg,
        filename,
        styles,
        sprites,
        warnings,
    }))
}

/// SHA-256 of `content` as hex, truncated to [`CONTENT_HASH_LENGTH`].
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(CONTENT_HASH_LENGTH);
    hex
}

/// Fill `[contenthash]` / `[hash]` in `pattern` with the hash of `content`.
pub fn hashed_filename(pattern: &str, content: &str) -> String {
    if !pattern.contains("[contenthash]") && !pattern.contains("[hash]") {
        return pattern.to_string();
    }
    let hash = content_hash(content);
    pattern
        .replace("[contenthash]", &hash)
        .replace("[hash]", &hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptimizeSetting, StylesConfig, Toggle};
    use crate::test_helpers::{sized_svg, view_box_svg};

    fn kinds(warnings: &[Warning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    fn sources() -> Vec<Source> {
        vec![
            Source::new("icons/a.svg", view_box_svg(10.0, 10.0, r#"<path d="M0 0"/>"#)),
            Source::new("icons/b.svg", sized_svg(20.0, 20.0)),
        ]
    }

    // =========================================================================
    // Option warnings
    // =========================================================================

    #[test]
    fn default_options_are_quiet() {
        assert!(option_warnings(&SpritemapConfig::default(), &sources()).is_empty());
    }

    #[test]
    fn collision_warned_once_regardless_of_sprite_count() {
        let mut config = SpritemapConfig::default();
        config.sprite.generate.view = Toggle::Flag(true);
        config.sprite.generate.use_ = true;
        let many: Vec<Source> = (0..5)
            .map(|i| Source::new(format!("{i}.svg"), sized_svg(1.0, 1.0)))
            .collect();
        let generated = generate(&many, &config, &Hooks::default()).unwrap().unwrap();
        let collisions = generated
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::IdentifierCollision)
            .count();
        assert_eq!(collisions, 1);
    }

    #[test]
    fn equal_postfixes_also_collide() {
        let mut config = SpritemapConfig::default();
        config.sprite.generate.symbol = Toggle::Postfix("-x".into());
        config.sprite.generate.view = Toggle::Postfix("-x".into());
        config.sprite.generate.use_ = true;
        assert_eq!(
            kinds(&option_warnings(&config, &[])),
            vec![WarningKind::IdentifierCollision]
        );
    }

    #[test]
    fn incompatible_toggles() {
        let mut config = SpritemapConfig::default();
        config.sprite.generate.symbol = Toggle::Flag(false);
        config.sprite.generate.use_ = true;
        config.sprite.generate.view = Toggle::Postfix("-view".into());
        config.sprite.generate.title = true;
        assert_eq!(
            kinds(&option_warnings(&config, &[])),
            vec![
                WarningKind::IncompatibleOptions,
                WarningKind::IncompatibleOptions
            ]
        );

        config.sprite.generate.use_ = false;
        config.sprite.generate.title = false;
        assert_eq!(
            kinds(&option_warnings(&config, &[])),
            vec![WarningKind::IncompatibleOptions]
        );
    }

    #[test]
    fn variables_with_css_and_fragment() {
        let mut config = SpritemapConfig::default();
        config.sprite.generate.use_ = true;
        config.sprite.generate.view = Toggle::Postfix("-view".into());
        config.output.filename = "sprites.[contenthash].svg".into();
        config.styles = Some(StylesConfig {
            filename: "sprites.css".into(),
            format: StyleFormat::Fragment,
            ..StylesConfig::default()
        });
        let sources = [Source::new(
            "a.svg",
            r#"<svg viewBox="0 0 1 1"><path var:c.fill="red"/></svg>"#,
        )];
        assert_eq!(
            kinds(&option_warnings(&config, &sources)),
            vec![
                WarningKind::VariablesUnsupported,
                WarningKind::VariablesWithFragment,
                WarningKind::FragmentWithHashedFilename
            ]
        );
    }

    #[test]
    fn fragment_without_view() {
        let mut config = SpritemapConfig::default();
        config.styles = Some(StylesConfig {
            format: StyleFormat::Fragment,
            ..StylesConfig::default()
        });
        assert_eq!(
            kinds(&option_warnings(&config, &[])),
            vec![WarningKind::FragmentWithoutView]
        );
    }

    // =========================================================================
    // Full pass
    // =========================================================================

    #[test]
    fn zero_sources_is_a_silent_no_op() {
        let config = SpritemapConfig::default();
        assert!(generate(&[], &config, &Hooks::default()).unwrap().is_none());
    }

    #[test]
    fn output_is_clean_and_optimized() {
        let mut config = SpritemapConfig::default();
        config.styles = Some(StylesConfig {
            filename: "sprites.scss".into(),
            ..StylesConfig::default()
        });
        let sources = [Source::new(
            "icons/a.svg",
            "<svg viewBox=\"0 0 1 1\">\n  <!-- icon -->\n  <path var:color.fill=\"red\" d=\"M0 0\"/>\n</svg>",
        )];
        let generated = generate(&sources, &config, &Hooks::default()).unwrap().unwrap();

        assert!(!generated.svg.contains("data-spritemap"));
        assert!(!generated.svg.contains("var:"));
        assert!(!generated.svg.contains("xmlns:var"));
        assert!(!generated.svg.contains("<!--"));
        assert!(generated.svg.contains(r#"fill="red""#));
        // Generated titles survive optimization.
        assert!(generated.svg.contains("<title>a</title>"));

        let styles = generated.styles.unwrap();
        assert!(styles.text.contains("fill='___color___'"));
        assert!(styles.text.contains("'a': ('color': 'red')"));
    }

    #[test]
    fn optimization_can_be_disabled() {
        let mut config = SpritemapConfig::default();
        config.output.optimize = OptimizeSetting::Enabled(false);
        let sources = [Source::new("a.svg", "<svg viewBox=\"0 0 1 1\"><!-- keep --></svg>")];
        let generated = generate(&sources, &config, &Hooks::default()).unwrap().unwrap();
        assert!(generated.svg.contains("<!-- keep -->"));
        assert!(!generated.svg.contains("data-spritemap"));
    }

    #[test]
    fn css_round_trip_selector() {
        let mut config = SpritemapConfig::default();
        config.styles = Some(StylesConfig {
            filename: "sprites.css".into(),
            ..StylesConfig::default()
        });
        let sources = [Source::new("icons/home.svg", view_box_svg(1.0, 1.0, ""))];
        let generated = generate(&sources, &config, &Hooks::default()).unwrap().unwrap();
        let css = generated.styles.unwrap().text;
        let rules: Vec<_> = css.lines().filter(|l| l.starts_with('.')).collect();
        assert_eq!(rules.len(), 1);
        assert!(rules[0].starts_with(".home {"));
    }

    #[test]
    fn unsupported_style_extension_is_fatal() {
        let mut config = SpritemapConfig::default();
        config.styles = Some(StylesConfig {
            filename: "sprites.styl".into(),
            ..StylesConfig::default()
        });
        assert!(matches!(
            generate(&sources(), &config, &Hooks::default()),
            Err(GenerateError::Style(StyleError::UnsupportedExtension(_)))
        ));
    }

    #[test]
    fn hooks_override_naming_and_post_process_styles() {
        let mut config = SpritemapConfig::default();
        config.styles = Some(StylesConfig {
            filename: "sprites.less".into(),
            ..StylesConfig::default()
        });
        let hooks = Hooks {
            prefix: Some(Prefix::Computed(Arc::new(|location: &str| {
                if location.starts_with("icons/") {
                    "icon-".to_string()
                } else {
                    "misc-".to_string()
                }
            }))),
            idify: Some(Idify::Custom(Arc::new(|name: &str| name.to_uppercase()))),
            styles_callback: Some(Arc::new(|text: &str| format!("// banner\n{text}"))),
            optimizer: None,
        };
        let generated = generate(&sources(), &config, &hooks).unwrap().unwrap();
        assert_eq!(generated.sprites[0].identifier, "icon-A");
        assert!(generated.svg.contains(r#"id="icon-A""#));
        assert!(generated.styles.unwrap().text.starts_with("// banner\n"));
    }

    #[test]
    fn custom_optimizer_is_used() {
        struct Upper;
        impl Optimizer for Upper {
            fn optimize(
                &self,
                svg: &str,
                _: &crate::optimize::OptimizerConfig,
            ) -> Result<String, OptimizeError> {
                Ok(svg.to_uppercase())
            }
        }
        let hooks = Hooks {
            optimizer: Some(Arc::new(Upper)),
            ..Hooks::default()
        };
        let generated = generate(&sources(), &SpritemapConfig::default(), &hooks)
            .unwrap()
            .unwrap();
        assert!(generated.svg.starts_with("<SVG"));
    }

    #[test]
    fn summaries_describe_layout() {
        let mut config = SpritemapConfig::default();
        config.sprite.gutter = 5.0;
        let generated = generate(&sources(), &config, &Hooks::default()).unwrap().unwrap();
        let ys: Vec<f64> = generated.sprites.iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![5.0, 20.0]);
    }

    #[test]
    fn pass_is_deterministic() {
        let config = SpritemapConfig::default();
        let first = generate(&sources(), &config, &Hooks::default()).unwrap().unwrap();
        let second = generate(&sources(), &config, &Hooks::default()).unwrap().unwrap();
        assert_eq!(first.svg, second.svg);
    }

    // =========================================================================
    // Content hashing
    // =========================================================================

    #[test]
    fn hashed_filename_replaces_both_tokens() {
        let hash = content_hash("<svg/>");
        assert_eq!(hash.len(), CONTENT_HASH_LENGTH);
        assert_eq!(
            hashed_filename("sprites.[contenthash].svg", "<svg/>"),
            format!("sprites.{hash}.svg")
        );
        assert_eq!(hashed_filename("s.[hash].svg", "<svg/>"), format!("s.{hash}.svg"));
        assert_eq!(hashed_filename("plain.svg", "<svg/>"), "plain.svg");
    }

    #[test]
    fn generated_filename_is_hashed() {
        let mut config = SpritemapConfig::default();
        config.output.filename = "sprites.[contenthash].svg".into();
        let generated = generate(&sources(), &config, &Hooks::default()).unwrap().unwrap();
        assert_eq!(
            generated.filename,
            format!("sprites.{}.svg", content_hash(&generated.svg))
        );
    }
}
