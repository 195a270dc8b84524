//! Plain CSS: one class rule per sprite.
//!
//! ```css
//! .arrow { background-image: url("data:image/svg+xml,..."); }
//! ```

use super::{Block, StyleContext, StyleSymbol, fill_template};
use crate::variables::strip_variables;

const TEMPLATE: &str = include_str!("templates/sprites.css");

pub fn format(symbols: &[StyleSymbol], context: &StyleContext<'_>) -> String {
    let lines = symbols
        .iter()
        .map(|symbol| {
            format!(
                ".{} {{ background-image: url(\"{}\"); }}",
                context.selector(symbol),
                context.url(symbol, strip_variables)
            )
        })
        .collect();
    fill_template(
        TEMPLATE,
        &[(
            "SPRITES",
            Block {
                lines,
                separator: "\n",
            },
        )],
        &[],
    )
}
