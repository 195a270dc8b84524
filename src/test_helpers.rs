//! Shared test utilities for the svg-spritemap test suite.
//!
//! Provides source SVG builders and an on-disk icon fixture for tests that
//! exercise scanning and the full generation pass.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let sources = vec![
//!     Source::new("icons/a.svg", sized_svg(10.0, 10.0)),
//!     Source::new("icons/b.svg", view_box_svg(24.0, 24.0, "<path d=\"M0 0\"/>")),
//! ];
//!
//! let tmp = setup_icons(&[("arrow.svg", &sized_svg(8.0, 8.0))]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::svg::Element;

// =========================================================================
// SVG builders
// =========================================================================

/// An empty SVG with numeric `width`/`height` and no viewBox.
pub fn sized_svg(width: f64, height: f64) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"/>"#
    )
}

/// An SVG sized only by its viewBox, with the given inner markup.
pub fn view_box_svg(width: f64, height: f64, inner: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}">{inner}</svg>"#
    )
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `files` (relative path, content) under `icons/` in a fresh temp dir.
///
/// Returns the temp dir, which acts as the config directory.
pub fn setup_icons(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(&tmp.path().join("icons"), files);
    tmp
}

pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Direct children of `root` with the given element name.
pub fn children_named<'a>(root: &'a Element, name: &str) -> Vec<&'a Element> {
    root.child_elements().filter(|e| e.name == name).collect()
}

/// Find a direct child by `id`. Panics if absent.
pub fn find_by_id<'a>(root: &'a Element, id: &str) -> &'a Element {
    root.child_elements()
        .find(|e| e.attribute("id") == Some(id))
        .unwrap_or_else(|| panic!("no element with id '{id}'"))
}
