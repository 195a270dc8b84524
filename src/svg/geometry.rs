//! Geometry resolution for one sprite.
//!
//! Every sprite ends up with a width, a height and a four-number viewBox,
//! or it is dropped. The fallback chain:
//!
//! | viewBox | width/height | Result |
//! |---|---|---|
//! | valid | both numeric | as given |
//! | valid | missing or non-numeric | taken from viewBox `[2]` / `[3]` |
//! | missing/malformed | both numeric | viewBox = `0 0 width height` |
//! | missing/malformed | either missing | [`GeometryError::InsufficientSizing`] |

use super::Element;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("no valid viewBox and no numeric width/height")]
    InsufficientSizing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    /// `[min-x, min-y, width, height]`
    pub view_box: [f64; 4],
}

impl Geometry {
    pub fn view_box_string(&self) -> String {
        format_view_box(&self.view_box)
    }
}

/// Resolve geometry from a sprite root's `width`, `height` and `viewBox`,
/// all looked up case-insensitively.
pub fn resolve(root: &Element) -> Result<Geometry, GeometryError> {
    let width = root.attribute_ignore_case("width").and_then(parse_length);
    let height = root.attribute_ignore_case("height").and_then(parse_length);
    let view_box = root.attribute_ignore_case("viewBox").and_then(parse_view_box);

    match (view_box, width, height) {
        (Some(vb), w, h) => Ok(Geometry {
            width: w.unwrap_or(vb[2]),
            height: h.unwrap_or(vb[3]),
            view_box: vb,
        }),
        (None, Some(w), Some(h)) => Ok(Geometry {
            width: w,
            height: h,
            view_box: [0.0, 0.0, w, h],
        }),
        _ => Err(GeometryError::InsufficientSizing),
    }
}

/// Parse exactly four finite numbers separated by whitespace and/or commas.
pub fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect::<Option<_>>()?;
    match numbers.as_slice() {
        [a, b, c, d] => Some([*a, *b, *c, *d]),
        _ => None,
    }
}

/// Parse a width/height value: a plain number, optionally suffixed with `px`.
/// Percentages and other units are treated as non-numeric.
pub fn parse_length(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number the way it appears in generated attributes:
/// integers without a fractional part, no negative zero.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

pub fn format_view_box(view_box: &[f64; 4]) -> String {
    view_box
        .iter()
        .map(|n| format_number(*n))
        .collect::<Vec<_>>()
        .join(" ")
}
