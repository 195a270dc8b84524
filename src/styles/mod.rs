//! Companion stylesheet generation.
//!
//! Every `<symbol>` of the assembled (not yet optimized) spritemap becomes
//! one stylesheet entry. Entries address their sprite in one of two ways:
//!
//! - **data**: a standalone single-sprite SVG, inlined as a data URI
//! - **fragment**: `<public path><spritemap file>#<view id>`, which needs
//!   `<view>` generation
//!
//! ## Languages
//!
//! The stylesheet filename's extension picks the formatter:
//!
//! | Extension | Formatter | Output |
//! |---|---|---|
//! | `.css` | [`css`] | one `.selector { background-image }` rule per sprite |
//! | `.scss`, `.sass` | [`scss`] | `sprites`, `sizes` and `variables` maps plus a mixin |
//! | `.less` | [`less`] | one `@selector: "url";` variable per sprite |
//!
//! Only the SCSS formatter understands `var:` variables; it writes
//! `___name___` tokens into the URIs which the generated mixin replaces.
//! The other formatters collapse variables to their default values.
//!
//! ## Templates
//!
//! Output is produced by substituting generated lines into fixed templates
//! (`templates/sprites.*`). Placeholders are block comments:
//! `/* SPRITES */`, `/* SIZES */`, `/* VARIABLES */` for content and
//! `/* VAR_SPRITES */`, `/* VAR_SIZES */`, `/* VAR_VARIABLES */`,
//! `/* VAR_MIXIN */` for configured names. A content placeholder with no
//! lines becomes `/* EMPTY */`, so the surrounding syntax stays valid.
//!
//! ## Symbol sources
//!
//! Formatters work on [`StyleSymbol`]s, which carry the sprite's provenance
//! (name and location) along with the symbol's attributes and children. They
//! come either straight from the in-memory [`Spritemap`]
//! ([`symbols_from_spritemap`]) or from re-parsing a serialized spritemap
//! through its bookkeeping attributes ([`symbols_from_svg`]).

pub mod css;
pub mod data_uri;
pub mod less;
pub mod scss;

use crate::config::{StyleFormat, StylesConfig};
use crate::naming::SpriteNaming;
use crate::spritemap::Spritemap;
use crate::svg::attributes::{SPRITE_LOCATION_ATTRIBUTE, SPRITE_NAME_ATTRIBUTE};
use crate::svg::geometry::parse_view_box;
use crate::svg::{Element, Node, ParseError, SVG_NAMESPACE, XLINK_NAMESPACE, parse_document};
use crate::types::Warning;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Marker written in place of a content placeholder that has no lines.
pub const EMPTY_MARKER: &str = "/* EMPTY */";

/// Symbol attributes a kept-attribute fragment never copies.
const FRAGMENT_EXCLUDED: &[&str] = &["id", "xmlns", SPRITE_NAME_ATTRIBUTE, SPRITE_LOCATION_ATTRIBUTE];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\* ([A-Z_]+) \*/").expect("valid regex"));

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("unsupported stylesheet extension '{0}' (expected css, scss, sass or less)")]
    UnsupportedExtension(String),
    #[error("symbol '{id}' is missing the {attribute} attribute")]
    MissingBookkeeping { id: String, attribute: &'static str },
    #[error("symbol '{id}' has no valid viewBox")]
    MissingViewBox { id: String },
    #[error("could not parse spritemap: {0}")]
    Parse(#[from] ParseError),
}

/// Stylesheet language, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleLanguage {
    Css,
    Scss,
    Less,
}

impl StyleLanguage {
    pub fn from_filename(filename: &str) -> Result<Self, StyleError> {
        let extension = Path::new(filename)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "css" => Ok(StyleLanguage::Css),
            "scss" | "sass" => Ok(StyleLanguage::Scss),
            "less" => Ok(StyleLanguage::Less),
            _ => Err(StyleError::UnsupportedExtension(extension)),
        }
    }

    pub fn supports_variables(&self) -> bool {
        matches!(self, StyleLanguage::Scss)
    }
}

/// A symbol plus the provenance stylesheet entries are named after.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSymbol {
    /// Sprite name: the file stem.
    pub name: String,
    pub location: String,
    pub view_box: [f64; 4],
    /// The symbol's attributes, as generated.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl StyleSymbol {
    /// Recover a symbol from a parsed `<symbol>` element.
    ///
    /// Fails when the bookkeeping attributes are missing, which means the
    /// document was not produced by the assembler (or was already cleaned).
    pub fn from_element(symbol: &Element) -> Result<Self, StyleError> {
        let id = || symbol.attribute("id").unwrap_or_default().to_string();
        let name = symbol
            .attribute(SPRITE_NAME_ATTRIBUTE)
            .ok_or_else(|| StyleError::MissingBookkeeping {
                id: id(),
                attribute: SPRITE_NAME_ATTRIBUTE,
            })?;
        let location = symbol
            .attribute(SPRITE_LOCATION_ATTRIBUTE)
            .ok_or_else(|| StyleError::MissingBookkeeping {
                id: id(),
                attribute: SPRITE_LOCATION_ATTRIBUTE,
            })?;
        let view_box = symbol
            .attribute("viewBox")
            .and_then(parse_view_box)
            .ok_or_else(|| StyleError::MissingViewBox { id: id() })?;
        Ok(Self {
            name: name.to_string(),
            location: location.to_string(),
            view_box,
            attributes: symbol.attributes.clone(),
            children: symbol.children.clone(),
        })
    }

    pub fn width(&self) -> f64 {
        self.view_box[2]
    }

    pub fn height(&self) -> f64 {
        self.view_box[3]
    }

    /// A standalone single-sprite `<svg>` with every child except `<title>`.
    ///
    /// The root declares `xmlns` (plus `xmlns:xlink` when a child needs it).
    /// With `keep_attributes` it also takes the symbol's own attributes,
    /// viewBox included, minus the id and the bookkeeping pair.
    pub fn fragment(&self, keep_attributes: bool) -> Element {
        let mut root = Element::new("svg");
        root.set_attribute("xmlns", SVG_NAMESPACE);
        if self.children.iter().any(uses_xlink) {
            root.set_attribute("xmlns:xlink", XLINK_NAMESPACE);
        }
        if keep_attributes {
            for (name, value) in &self.attributes {
                if !FRAGMENT_EXCLUDED.contains(&name.as_str()) {
                    root.set_attribute(name.as_str(), value.as_str());
                }
            }
        }
        root.children = self
            .children
            .iter()
            .filter(|child| !matches!(child, Node::Element(e) if e.name == "title"))
            .cloned()
            .collect();
        root
    }
}

fn uses_xlink(node: &Node) -> bool {
    match node {
        Node::Element(e) => {
            e.attributes.iter().any(|(name, _)| name.starts_with("xlink:"))
                || e.children.iter().any(uses_xlink)
        }
        _ => false,
    }
}

/// Style symbols for every placed sprite with a `<symbol>`, straight from memory.
pub fn symbols_from_spritemap(spritemap: &Spritemap) -> Vec<StyleSymbol> {
    spritemap
        .symbols()
        .map(|(sprite, symbol)| StyleSymbol {
            name: sprite.item.name.clone(),
            location: sprite.item.location.clone(),
            view_box: sprite.geometry.view_box,
            attributes: symbol.attributes.clone(),
            children: symbol.children.clone(),
        })
        .collect()
}

/// Style symbols recovered from a serialized, uncleaned spritemap.
pub fn symbols_from_svg(svg: &str) -> Result<Vec<StyleSymbol>, StyleError> {
    let root = parse_document(svg)?;
    root.child_elements()
        .filter(|e| e.name == "symbol")
        .map(StyleSymbol::from_element)
        .collect()
}

/// Everything a formatter needs besides the symbols.
#[derive(Debug, Clone, Copy)]
pub struct StyleContext<'a> {
    pub config: &'a StylesConfig,
    pub naming: &'a SpriteNaming,
    /// Output `public_path`, prepended to fragment URLs.
    pub public_path: &'a str,
    /// Spritemap filename fragment URLs point at.
    pub spritemap_filename: &'a str,
    /// Postfix of generated `<view>` ids.
    pub view_postfix: &'a str,
}

impl StyleContext<'_> {
    /// Selector for a symbol: its name, prefixed when `selectors.prefix` is on.
    pub fn selector(&self, symbol: &StyleSymbol) -> String {
        if self.config.selectors.prefix {
            format!("{}{}", self.naming.prefix.for_location(&symbol.location), symbol.name)
        } else {
            symbol.name.clone()
        }
    }

    /// URL of a symbol in fragment format.
    pub fn fragment_url(&self, symbol: &StyleSymbol) -> String {
        format!(
            "{}{}#{}{}",
            self.public_path,
            self.spritemap_filename,
            self.naming.identifier(&symbol.location, &symbol.name),
            self.view_postfix
        )
    }

    /// URL of a symbol; `prepare` rewrites the fragment markup before it is
    /// turned into a data URI.
    pub fn url(&self, symbol: &StyleSymbol, prepare: impl Fn(&str) -> String) -> String {
        match self.config.format {
            StyleFormat::Fragment => self.fragment_url(symbol),
            StyleFormat::Data => {
                let markup = symbol.fragment(self.config.attributes.keep).to_xml_string();
                data_uri::svg_to_data_uri(&prepare(&markup))
            }
        }
    }
}

/// Generated stylesheet text plus formatter warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOutput {
    pub text: String,
    pub warnings: Vec<Warning>,
}

/// Format `symbols` in `language`.
pub fn format_styles(
    language: StyleLanguage,
    symbols: &[StyleSymbol],
    context: &StyleContext<'_>,
) -> StyleOutput {
    tracing::debug!(?language, symbols = symbols.len(), "formatting stylesheet");
    match language {
        StyleLanguage::Css => StyleOutput {
            text: css::format(symbols, context),
            warnings: Vec::new(),
        },
        StyleLanguage::Less => StyleOutput {
            text: less::format(symbols, context),
            warnings: Vec::new(),
        },
        StyleLanguage::Scss => scss::format(symbols, context),
    }
}

/// Lines for one content placeholder.
pub struct Block {
    pub lines: Vec<String>,
    pub separator: &'static str,
}

/// Substitute placeholders in `template`.
///
/// `blocks` fill content placeholders (empty ones become [`EMPTY_MARKER`]),
/// `names` fill `VAR_*` placeholders. Unknown placeholders are left alone.
pub fn fill_template(template: &str, blocks: &[(&str, Block)], names: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let token = &caps[1];
            if let Some((_, block)) = blocks.iter().find(|(name, _)| *name == token) {
                return if block.lines.is_empty() {
                    EMPTY_MARKER.to_string()
                } else {
                    block.lines.join(block.separator)
                };
            }
            match names.iter().find(|(name, _)| *name == token) {
                Some((_, value)) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
