//! # svg-spritemap
//!
//! Assembles a directory of SVG icons into a single spritemap SVG. Every icon
//! becomes a `<symbol>` that pages reference with `<use href="#id">`; icons can
//! also be stacked vertically as `<use>` elements and addressed through
//! `<view>` fragments (`spritemap.svg#sprite-arrow-view`), which is what CSS
//! `background-image` needs. An optional companion stylesheet (CSS, SCSS or
//! LESS) exposes every icon as a data URI or a fragment URL.
//!
//! # Architecture: One Pass, Pure Core
//!
//! ```text
//! 1. Scan       icons/   →  Vec<Source>      (filesystem → location + markup)
//! 2. Generate   sources  →  Generated        (spritemap, stylesheet, warnings)
//! 3. Write      Generated →  dist/, styles    (only when content changed)
//! ```
//!
//! Everything between scan and write is a pure function of the sources and
//! the configuration: no I/O, no global state. Given the same inputs the
//! output is byte-identical, including the optional content hash in the
//! filename.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks input directories and reads matching files into [`types::Source`]s |
//! | [`generate`] | Runs the whole pass: warnings, assembly, styles, optimization, hashing |
//! | [`spritemap`] | Builds the `<svg>` root with symbols, uses and views in a stacked layout |
//! | [`styles`] | CSS / SCSS / LESS formatters and the data URI encoder |
//! | [`optimize`] | Bookkeeping cleanup and the pluggable SVG minifier |
//! | [`variables`] | The `var:` attribute syntax: discovery, rewriting, placeholders |
//! | [`svg`] | Owned element tree, attribute policy, geometry resolution |
//! | [`naming`] | Prefix / idify strategies turning file names into identifiers |
//! | [`config`] | `spritemap.toml` loading, validation, stock defaults |
//! | [`types`] | Shared types: sources, sprite items, warnings |
//! | [`output`] | CLI output formatting and change-aware file writing |
//!
//! # Design Decisions
//!
//! ## Warnings, Not Errors
//!
//! A broken icon should not fail a build of two hundred good ones. Per-sprite
//! problems (unparsable markup, no usable size, duplicate identifiers) and
//! contradictory option combinations are collected as [`types::Warning`]s and
//! returned alongside the output. Only configuration errors, I/O failures and
//! stylesheet formatting failures are hard errors.
//!
//! ## Owned Tree Instead of a DOM
//!
//! Sources are parsed with `roxmltree` and immediately converted into the small
//! owned [`svg::Element`] tree. Building symbols means cloning children and
//! rewriting attributes, which is plain `Vec` manipulation on owned data.
//! Serialization goes through `quick-xml` events in stored attribute order, so
//! the output is stable.
//!
//! ## Variables Live in a Namespace
//!
//! `var:color.fill="#000"` is a real namespaced attribute while the spritemap
//! is assembled, so it survives cloning and optimization. The final output
//! strips it back to `fill="#000"`; the SCSS formatter instead replaces the
//! value with a `___color___` token its mixin can substitute.

pub mod config;
pub mod generate;
pub mod naming;
pub mod optimize;
pub mod output;
pub mod scan;
pub mod spritemap;
pub mod styles;
pub mod svg;
pub mod types;
pub mod variables;

#[cfg(test)]
pub(crate) mod test_helpers;
