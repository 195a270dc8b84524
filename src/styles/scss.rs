//! SCSS / Sass: three maps and a mixin.
//!
//! ```scss
//! $sprites: (
//! 'arrow': "data:image/svg+xml,...fill='___color___'..."
//! );
//! $sizes: (
//! 'arrow': (width: 24px, height: 24px)
//! );
//! $variables: (
//! 'arrow': ('color': 'red')
//! );
//! ```
//!
//! Sprites with `var:` attributes get `___name___` tokens in their URI and an
//! entry in the variables map holding each variable's first default value.
//! The template's mixin swaps the tokens for caller values (or the defaults).
//! Variables reused with different defaults are reported, across all symbols.

use super::{Block, StyleContext, StyleOutput, StyleSymbol, fill_template};
use crate::svg::geometry::format_number;
use crate::types::{Warning, WarningKind};
use crate::variables::{find_default_value_mismatches, find_unique_variables, placeholder_variables};

const TEMPLATE: &str = include_str!("templates/sprites.scss");

pub fn format(symbols: &[StyleSymbol], context: &StyleContext<'_>) -> StyleOutput {
    let keep = context.config.attributes.keep;
    let mut sprites = Vec::with_capacity(symbols.len());
    let mut sizes = Vec::with_capacity(symbols.len());
    let mut variables = Vec::new();
    let mut markups = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let selector = context.selector(symbol);
        let markup = symbol.fragment(keep).to_xml_string();

        sprites.push(format!(
            "'{selector}': \"{}\"",
            context.url(symbol, placeholder_variables)
        ));
        sizes.push(format!(
            "'{selector}': (width: {}px, height: {}px)",
            format_number(symbol.width()),
            format_number(symbol.height())
        ));

        let unique = find_unique_variables(&markup);
        if !unique.is_empty() {
            let entries: Vec<String> = unique
                .iter()
                .map(|v| format!("'{}': '{}'", v.name, v.value))
                .collect();
            variables.push(format!("'{selector}': ({})", entries.join(", ")));
        }
        markups.push(markup);
    }

    let warnings = find_default_value_mismatches(&markups)
        .into_iter()
        .map(|mismatch| {
            Warning::new(
                WarningKind::DefaultValueMismatch,
                format!(
                    "Variable '{}' has different default values ({}); the first one is used",
                    mismatch.name,
                    mismatch.values.join(", ")
                ),
            )
        })
        .collect();

    let names = &context.config.variables;
    let text = fill_template(
        TEMPLATE,
        &[
            (
                "SPRITES",
                Block {
                    lines: sprites,
                    separator: ",\n",
                },
            ),
            (
                "SIZES",
                Block {
                    lines: sizes,
                    separator: ",\n",
                },
            ),
            (
                "VARIABLES",
                Block {
                    lines: variables,
                    separator: ",\n",
                },
            ),
        ],
        &[
            ("VAR_SPRITES", &names.sprites),
            ("VAR_SIZES", &names.sizes),
            ("VAR_VARIABLES", &names.variables),
            ("VAR_MIXIN", &names.mixin),
        ],
    );
    StyleOutput { text, warnings }
}
