//! Sprite naming: how a source location becomes an identifier.
//!
//! Every sprite gets three names derived from its location:
//!
//! - **name**: the file stem (`icons/arrow-left.svg` → `arrow-left`)
//! - **title**: the display string for generated `<title>` elements (same as name)
//! - **identifier**: `prefix(location) + idify(name)`, used for DOM ids
//!
//! Prefix and idify are strategies. The TOML config can only express the
//! constant forms (a fixed prefix string, keep or sanitize); callers using
//! the library can plug in any `Fn(&str) -> String`.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A caller-supplied `(input) -> output` naming function.
pub type NameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Strategy producing the identifier prefix for a sprite location.
#[derive(Clone)]
pub enum Prefix {
    Fixed(String),
    Computed(NameFn),
}

impl Prefix {
    pub fn for_location(&self, location: &str) -> String {
        match self {
            Prefix::Fixed(prefix) => prefix.clone(),
            Prefix::Computed(f) => f(location),
        }
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Prefix::Fixed("sprite-".to_string())
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Fixed(prefix) => f.debug_tuple("Fixed").field(prefix).finish(),
            Prefix::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Strategy turning an arbitrary basename into an identifier token.
#[derive(Clone, Default)]
pub enum Idify {
    /// Pass the name through unchanged.
    #[default]
    Keep,
    /// Replace anything outside `[A-Za-z0-9_-]` with `-`.
    Sanitize,
    Custom(NameFn),
}

impl Idify {
    pub fn apply(&self, name: &str) -> String {
        match self {
            Idify::Keep => name.to_string(),
            Idify::Sanitize => sanitize_identifier(name),
            Idify::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for Idify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Idify::Keep => f.write_str("Keep"),
            Idify::Sanitize => f.write_str("Sanitize"),
            Idify::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Result of parsing a sprite location like `icons/nav/arrow-left.svg`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteName {
    /// File stem, extension removed.
    pub name: String,
    /// Display title for `<title>` elements.
    pub title: String,
}

/// Derive the name and display title from a location.
///
/// - `"icons/arrow-left.svg"` → name="arrow-left"
/// - `"logo.min.svg"` → name="logo.min" (only the last extension is removed)
/// - `"icons/.svg"` → name=".svg" (dotfiles keep their name)
pub fn parse_sprite_name(location: &str) -> SpriteName {
    let name = Path::new(location)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| location.to_string());
    SpriteName {
        title: name.clone(),
        name,
    }
}

/// Make `name` a syntactically valid XML id / CSS identifier token.
///
/// - `"arrow left"` → `"arrow-left"`
/// - `"2col"` → `"_2col"`
/// - `"ümlaut"` → `"-mlaut"`
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Resolves identifiers for sprites from the configured strategies.
#[derive(Debug, Clone, Default)]
pub struct SpriteNaming {
    pub prefix: Prefix,
    pub idify: Idify,
}

impl SpriteNaming {
    pub fn new(prefix: Prefix, idify: Idify) -> Self {
        Self { prefix, idify }
    }

    /// `prefix(location) + idify(title)`.
    pub fn identifier(&self, location: &str, title: &str) -> String {
        format!("{}{}", self.prefix.for_location(location), self.idify.apply(title))
    }
}
