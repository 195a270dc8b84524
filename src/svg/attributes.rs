//! Attribute policy: which source-root attributes reach which generated element.
//!
//! Two filters run in sequence:
//!
//! 1. **Transfer exclusion** ([`transferable_attributes`]): drop the
//!    attributes the assembler owns (`viewBox`, `width`, `height`, `id`,
//!    `xmlns` and the bookkeeping attributes), compared case-insensitively.
//!    The remainder is the same for every generated element kind.
//! 2. **Per-kind validity** ([`attributes_for`]): keep only attributes that
//!    are valid on the target kind: the global core set plus the subset of
//!    `<svg>` root attributes the target element also accepts.
//!
//! `xmlns:*` declarations are handled separately by
//! [`namespace_declarations`]; they are promoted onto the spritemap root.

use super::Element;

/// Bookkeeping attribute carrying the sprite name through serialization.
pub const SPRITE_NAME_ATTRIBUTE: &str = "data-spritemap-name";
/// Bookkeeping attribute carrying the sprite location through serialization.
pub const SPRITE_LOCATION_ATTRIBUTE: &str = "data-spritemap-location";

const TRANSFER_EXCLUDED: &[&str] = &[
    "viewbox",
    "width",
    "height",
    "id",
    "xmlns",
    SPRITE_NAME_ATTRIBUTE,
    SPRITE_LOCATION_ATTRIBUTE,
];

/// The generated element kinds attributes can be copied onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Symbol,
    Use,
    View,
}

/// Valid on every element kind.
const GLOBAL: &[&str] = &[
    "class",
    "lang",
    "style",
    "tabindex",
    "xml:base",
    "xml:lang",
    "xml:space",
];

/// Presentation attributes: accepted by `<svg>`, `<symbol>` and `<use>`.
const PRESENTATION: &[&str] = &[
    "alignment-baseline",
    "baseline-shift",
    "clip",
    "clip-path",
    "clip-rule",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-profile",
    "color-rendering",
    "cursor",
    "direction",
    "display",
    "dominant-baseline",
    "enable-background",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "flood-color",
    "flood-opacity",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "glyph-orientation-horizontal",
    "glyph-orientation-vertical",
    "image-rendering",
    "kerning",
    "letter-spacing",
    "lighting-color",
    "marker-end",
    "marker-mid",
    "marker-start",
    "mask",
    "opacity",
    "overflow",
    "pointer-events",
    "shape-rendering",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "text-decoration",
    "text-rendering",
    "unicode-bidi",
    "visibility",
    "word-spacing",
    "writing-mode",
];

struct AttributeTable {
    presentation: bool,
    names: &'static [&'static str],
    prefixes: &'static [&'static str],
}

impl AttributeTable {
    fn accepts(&self, name: &str) -> bool {
        (self.presentation && PRESENTATION.contains(&name))
            || self.names.contains(&name)
            || self.prefixes.iter().any(|p| name.starts_with(p))
    }
}

const SYMBOL: AttributeTable = AttributeTable {
    presentation: true,
    names: &[
        "externalResourcesRequired",
        "preserveAspectRatio",
        "role",
    ],
    prefixes: &["aria-", "data-", "on"],
};

const USE: AttributeTable = AttributeTable {
    presentation: true,
    names: &[
        "externalResourcesRequired",
        "requiredExtensions",
        "requiredFeatures",
        "role",
        "systemLanguage",
    ],
    prefixes: &["aria-", "data-", "on"],
};

const VIEW: AttributeTable = AttributeTable {
    presentation: false,
    names: &[
        "externalResourcesRequired",
        "preserveAspectRatio",
        "zoomAndPan",
    ],
    prefixes: &[],
};

fn table(kind: TargetKind) -> &'static AttributeTable {
    match kind {
        TargetKind::Symbol => &SYMBOL,
        TargetKind::Use => &USE,
        TargetKind::View => &VIEW,
    }
}

/// Whether `name` may appear on a generated element of `kind`.
pub fn is_valid_for(kind: TargetKind, name: &str) -> bool {
    GLOBAL.contains(&name) || table(kind).accepts(name)
}

/// Source-root attributes the assembler does not own, in document order.
pub fn transferable_attributes(root: &Element) -> Vec<(String, String)> {
    root.attributes
        .iter()
        .filter(|(name, _)| {
            !TRANSFER_EXCLUDED
                .iter()
                .any(|excluded| name.eq_ignore_ascii_case(excluded))
        })
        .cloned()
        .collect()
}

/// The transferable attributes that are valid on `kind`.
pub fn attributes_for(kind: TargetKind, transferable: &[(String, String)]) -> Vec<(String, String)> {
    transferable
        .iter()
        .filter(|(name, _)| is_valid_for(kind, name))
        .cloned()
        .collect()
}

/// `xmlns:*` declarations on a source root, to be promoted onto the spritemap root.
pub fn namespace_declarations(root: &Element) -> impl Iterator<Item = (&str, &str)> {
    root.attributes
        .iter()
        .filter(|(name, _)| name.starts_with("xmlns:"))
        .map(|(name, value)| (name.as_str(), value.as_str()))
}
