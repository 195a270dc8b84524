//! CLI output formatting and writing.
//!
//! # Information-First Display
//!
//! Every sprite is shown by its identity (positional index + identifier),
//! with its source file and placement as indented context lines. Warnings
//! are grouped at the end so they are never lost between sprite lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Sources
//! 001 arrow
//!     Source: icons/arrow.svg
//! 002 home
//!     Source: icons/nav/home.svg
//!
//! Found 2 sources
//! ```
//!
//! ## Build
//!
//! ```text
//! Sprites
//! 001 sprite-arrow
//!     Source: icons/arrow.svg
//!     Size: 24x24 at y=0
//!
//! Spritemap → dist/spritemap.svg (written)
//! Styles → src/sprites.scss (unchanged)
//!
//! Warnings
//!     [insufficient-sizing] Sprite 'icons/broken.svg' skipped: ...
//!
//! Generated 1 sprite
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::Generated;
use crate::naming::parse_sprite_name;
use crate::svg::geometry::format_number;
use crate::types::{Source, Warning};
use std::fs;
use std::io;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format discovered sources.
pub fn format_scan_output(sources: &[Source]) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];
    for (i, source) in sources.iter().enumerate() {
        let name = parse_sprite_name(&source.location).name;
        lines.push(format!("{} {}", format_index(i + 1), name));
        lines.push(format!("{}Source: {}", indent(1), source.location));
    }
    lines.push(String::new());
    lines.push(format!("Found {}", plural(sources.len(), "source")));
    lines
}

/// Print discovered sources to stdout.
pub fn print_scan_output(sources: &[Source]) {
    for line in format_scan_output(sources) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Whether a written file's content actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: String,
    pub changed: bool,
}

impl WrittenFile {
    fn status(&self) -> &'static str {
        if self.changed { "written" } else { "unchanged" }
    }
}

/// Format the result of a build.
pub fn format_build_output(
    generated: &Generated,
    spritemap: &WrittenFile,
    styles: Option<&WrittenFile>,
) -> Vec<String> {
    let mut lines = vec!["Sprites".to_string()];
    for (i, sprite) in generated.sprites.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), sprite.identifier));
        lines.push(format!("{}Source: {}", indent(1), sprite.location));
        lines.push(format!(
            "{}Size: {}x{} at y={}",
            indent(1),
            format_number(sprite.width),
            format_number(sprite.height),
            format_number(sprite.y)
        ));
    }
    lines.push(String::new());
    lines.push(format!("Spritemap → {} ({})", spritemap.path, spritemap.status()));
    if let Some(styles) = styles {
        lines.push(format!("Styles → {} ({})", styles.path, styles.status()));
    }
    if !generated.warnings.is_empty() {
        lines.push(String::new());
        lines.extend(format_warnings(&generated.warnings));
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {}",
        plural(generated.sprites.len(), "sprite")
    ));
    lines
}

/// Print the result of a build to stdout.
pub fn print_build_output(
    generated: &Generated,
    spritemap: &WrittenFile,
    styles: Option<&WrittenFile>,
) {
    for line in format_build_output(generated, spritemap, styles) {
        println!("{}", line);
    }
}

/// Format warnings as an indented block.
pub fn format_warnings(warnings: &[Warning]) -> Vec<String> {
    let mut lines = vec!["Warnings".to_string()];
    lines.extend(warnings.iter().map(|w| format!("{}{}", indent(1), w)));
    lines
}

// ============================================================================
// Writing
// ============================================================================

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Creates parent directories. Returns whether the file was written.
pub fn write_if_changed(path: &Path, content: &str) -> io::Result<bool> {
    if fs::read(path).is_ok_and(|existing| existing == content.as_bytes()) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratedStyles, SpriteSummary};
    use crate::types::WarningKind;
    use tempfile::TempDir;

    fn generated(warnings: Vec<Warning>) -> Generated {
        Generated {
            svg: "<svg/>".into(),
            filename: "spritemap.svg".into(),
            styles: Some(GeneratedStyles {
                filename: "sprites.css".into(),
                text: String::new(),
            }),
            sprites: vec![SpriteSummary {
                identifier: "sprite-arrow".into(),
                location: "icons/arrow.svg".into(),
                width: 24.0,
                height: 16.0,
                y: 0.0,
            }],
            warnings,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn scan_output_lists_sources() {
        let sources = vec![
            Source::new("icons/arrow.svg", ""),
            Source::new("icons/nav/home.svg", ""),
        ];
        assert_eq!(
            format_scan_output(&sources),
            vec![
                "Sources",
                "001 arrow",
                "    Source: icons/arrow.svg",
                "002 home",
                "    Source: icons/nav/home.svg",
                "",
                "Found 2 sources",
            ]
        );
    }

    #[test]
    fn build_output_without_warnings() {
        let spritemap = WrittenFile {
            path: "dist/spritemap.svg".into(),
            changed: true,
        };
        let styles = WrittenFile {
            path: "sprites.css".into(),
            changed: false,
        };
        assert_eq!(
            format_build_output(&generated(vec![]), &spritemap, Some(&styles)),
            vec![
                "Sprites",
                "001 sprite-arrow",
                "    Source: icons/arrow.svg",
                "    Size: 24x16 at y=0",
                "",
                "Spritemap → dist/spritemap.svg (written)",
                "Styles → sprites.css (unchanged)",
                "",
                "Generated 1 sprite",
            ]
        );
    }

    #[test]
    fn build_output_lists_warnings() {
        let warning = Warning::new(WarningKind::EmptySource, "Sprite 'icons/e.svg' has no content");
        let spritemap = WrittenFile {
            path: "spritemap.svg".into(),
            changed: true,
        };
        let lines = format_build_output(&generated(vec![warning]), &spritemap, None);
        assert!(lines.contains(&"Warnings".to_string()));
        assert!(lines.contains(&"    [empty-source] Sprite 'icons/e.svg' has no content".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Styles")));
    }

    #[test]
    fn write_if_changed_skips_identical_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out/sprites.css");
        assert!(write_if_changed(&path, "a").unwrap());
        assert!(!write_if_changed(&path, "a").unwrap());
        assert!(write_if_changed(&path, "b").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }
}
