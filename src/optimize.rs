//! Post-processing of the assembled spritemap.
//!
//! Two steps run on the serialized document after stylesheets have been
//! generated from it:
//!
//! 1. [`clean_svg`] strips the `data-spritemap-*` bookkeeping attributes.
//! 2. [`optimize_svg`] hands the text to an [`Optimizer`] under a fixed
//!    override policy: identifier cleanup and hidden-element removal are
//!    always off (ids are how `<use>` and stylesheets address sprites, and
//!    every `<symbol>` is hidden by definition), and `<title>` removal is
//!    off whenever titles were generated on purpose.
//!
//! The built-in [`Minifier`] is a small tree-level optimizer in the spirit
//! of svag: parse, drop nodes, serialize. Library users can plug in their
//! own [`Optimizer`]; it receives the already-overridden configuration.

use crate::svg::{Element, Node, ParseError, parse_document};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

static BOOKKEEPING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*data-spritemap-(?:name|location)="[^"]*""#).expect("valid regex")
});

/// Elements whose whitespace-only text is significant.
const WHITESPACE_SENSITIVE: &[&str] = &["text", "tspan", "textPath", "style", "script"];

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("optimizer could not parse spritemap: {0}")]
    Parse(#[from] ParseError),
    #[error("optimizer failed: {0}")]
    Failed(String),
}

/// Optimizer passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    pub remove_comments: bool,
    /// Drop `<metadata>` elements.
    pub remove_metadata: bool,
    /// Drop whitespace-only text between elements.
    pub collapse_whitespace: bool,
    pub remove_title: bool,
    pub remove_desc: bool,
    /// Drop `display="none"` / `visibility="hidden"` / `opacity="0"` elements.
    /// Always overridden to `false`.
    pub remove_hidden_elems: bool,
    /// Drop ids that nothing references. Always overridden to `false`.
    pub cleanup_ids: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            remove_comments: true,
            remove_metadata: true,
            collapse_whitespace: true,
            remove_title: true,
            remove_desc: false,
            remove_hidden_elems: false,
            cleanup_ids: false,
        }
    }
}

impl OptimizerConfig {
    /// Apply the non-negotiable overrides on top of a caller configuration.
    pub fn with_overrides(&self, keep_titles: bool) -> Self {
        Self {
            remove_hidden_elems: false,
            cleanup_ids: false,
            remove_title: self.remove_title && !keep_titles,
            ..self.clone()
        }
    }
}

/// A whole-document SVG optimizer.
pub trait Optimizer: Send + Sync {
    fn optimize(&self, svg: &str, config: &OptimizerConfig) -> Result<String, OptimizeError>;
}

/// The built-in optimizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minifier;

impl Optimizer for Minifier {
    fn optimize(&self, svg: &str, config: &OptimizerConfig) -> Result<String, OptimizeError> {
        let mut root = parse_document(svg)?;
        minify_element(&mut root, config);
        if config.cleanup_ids {
            let referenced = referenced_ids(svg);
            remove_unreferenced_ids(&mut root, &referenced);
        }
        Ok(root.to_xml_string())
    }
}

fn minify_element(element: &mut Element, config: &OptimizerConfig) {
    let keep_whitespace = WHITESPACE_SENSITIVE.contains(&element.name.as_str());
    element.children.retain(|child| match child {
        Node::Comment(_) => !config.remove_comments,
        Node::Text(text) => {
            keep_whitespace || !config.collapse_whitespace || !text.trim().is_empty()
        }
        Node::Element(e) => !is_removed(e, config),
    });
    for child in &mut element.children {
        if let Node::Element(e) = child {
            minify_element(e, config);
        }
    }
}

fn is_removed(element: &Element, config: &OptimizerConfig) -> bool {
    match element.name.as_str() {
        "metadata" => config.remove_metadata,
        "title" => config.remove_title,
        "desc" => config.remove_desc,
        _ => config.remove_hidden_elems && is_hidden(element),
    }
}

fn is_hidden(element: &Element) -> bool {
    element.attribute("display") == Some("none")
        || element.attribute("visibility") == Some("hidden")
        || element.attribute("opacity") == Some("0")
}

fn referenced_ids(svg: &str) -> HashSet<String> {
    static REFERENCE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r##"#([A-Za-z_][\w.:-]*)"##).expect("valid regex"));
    REFERENCE
        .captures_iter(svg)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn remove_unreferenced_ids(element: &mut Element, referenced: &HashSet<String>) {
    if element
        .attribute("id")
        .is_some_and(|id| !referenced.contains(id))
    {
        element.remove_attribute("id");
    }
    for child in &mut element.children {
        if let Node::Element(e) = child {
            remove_unreferenced_ids(e, referenced);
        }
    }
}

/// Strip the bookkeeping attributes from a serialized spritemap.
pub fn clean_svg(svg: &str) -> String {
    BOOKKEEPING_PATTERN.replace_all(svg, "").into_owned()
}

/// Run `optimizer` over `svg` unless optimization is disabled (`config == None`).
pub fn optimize_svg(
    svg: &str,
    config: Option<&OptimizerConfig>,
    keep_titles: bool,
    optimizer: &dyn Optimizer,
) -> Result<String, OptimizeError> {
    let Some(config) = config else {
        return Ok(svg.to_string());
    };
    let effective = config.with_overrides(keep_titles);
    tracing::debug!(?effective, "optimizing spritemap");
    optimizer.optimize(svg, &effective)
}
