//! Variables: author-declared placeholder values inside source SVGs.
//!
//! A source SVG can mark an attribute value as overridable from the
//! stylesheet by writing it in the `var` namespace:
//!
//! ```text
//! <path var:color.fill="#000" d="..."/>     name=color, attribute=fill, value=#000
//! <path var:stroke="red" d="..."/>          name=stroke, attribute=stroke, value=red
//! ```
//!
//! The grammar is `var:<name>[.<attribute>]="<value>"`. The value capture is
//! non-greedy and ends at the first following `"`, so values containing a
//! literal quote are truncated. Templates downstream only handle simple
//! values, so this is kept as-is.
//!
//! The spritemap that ships to browsers never contains the namespace:
//! [`strip_variables`] collapses every occurrence back to `attribute="value"`.
//! The Sass formatter instead rewrites values to `___name___` tokens which
//! the generated mixin substitutes at compile time.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Namespace URI bound to the `var` prefix.
pub const VARIABLES_NAMESPACE: &str = "urn:svg-spritemap:variables";

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"var:([^\s.]+)\.?(\S*)="(.*?)""#).expect("valid regex"));

static NAMESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*xmlns:var="[^"]*""#).expect("valid regex"));

/// One `var:` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// Target attribute; defaults to `name` when the `.attribute` part is absent.
    pub attribute: String,
    /// Default value written in the source.
    pub value: String,
}

/// A variable name used with more than one default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValueMismatch {
    pub name: String,
    /// Every value in encounter order, duplicates included.
    pub values: Vec<String>,
}

fn variable_from_captures(caps: &regex::Captures<'_>) -> Variable {
    let name = caps[1].to_string();
    let attribute = match &caps[2] {
        "" => name.clone(),
        attribute => attribute.to_string(),
    };
    Variable {
        name,
        attribute,
        value: caps[3].to_string(),
    }
}

/// All occurrences, in order of appearance.
pub fn find_variables(text: &str) -> Vec<Variable> {
    VARIABLE_PATTERN
        .captures_iter(text)
        .map(|caps| variable_from_captures(&caps))
        .collect()
}

/// First occurrence of each distinct name, in order of first appearance.
pub fn find_unique_variables(text: &str) -> Vec<Variable> {
    let mut unique: Vec<Variable> = Vec::new();
    for variable in find_variables(text) {
        if !unique.iter().any(|v| v.name == variable.name) {
            unique.push(variable);
        }
    }
    unique
}

/// Names whose occurrences across `texts` disagree on the default value.
pub fn find_default_value_mismatches<S: AsRef<str>>(texts: &[S]) -> Vec<DefaultValueMismatch> {
    let mut groups: Vec<DefaultValueMismatch> = Vec::new();
    for text in texts {
        for variable in find_variables(text.as_ref()) {
            match groups.iter_mut().find(|g| g.name == variable.name) {
                Some(group) => group.values.push(variable.value),
                None => groups.push(DefaultValueMismatch {
                    name: variable.name,
                    values: vec![variable.value],
                }),
            }
        }
    }
    groups
        .into_iter()
        .filter(|group| {
            let first = &group.values[0];
            group.values.iter().any(|v| v != first)
        })
        .collect()
}

/// Whether any of `texts` contains a variable.
pub fn has_variables<S: AsRef<str>>(texts: &[S]) -> bool {
    texts
        .iter()
        .any(|text| VARIABLE_PATTERN.is_match(text.as_ref()))
}

/// Whether `text` already declares the `var` namespace.
pub fn has_variables_namespace(text: &str) -> bool {
    NAMESPACE_PATTERN.is_match(text)
}

/// Replace every occurrence with the rewriter's output, then remove any
/// `xmlns:var` declaration (whether or not anything was replaced).
pub fn rewrite_variables<F>(text: &str, rewriter: F) -> String
where
    F: Fn(&Variable) -> String,
{
    let rewritten =
        VARIABLE_PATTERN.replace_all(text, |caps: &regex::Captures<'_>| {
            rewriter(&variable_from_captures(caps))
        });
    NAMESPACE_PATTERN.replace_all(&rewritten, "").into_owned()
}

/// Collapse the templating syntax back to plain `attribute="value"`.
pub fn strip_variables(text: &str) -> String {
    rewrite_variables(text, |v| format!(r#"{}="{}""#, v.attribute, v.value))
}

/// Rewrite values into `___name___` tokens for runtime substitution.
pub fn placeholder_variables(text: &str) -> String {
    rewrite_variables(text, |v| format!(r#"{}="___{}___""#, v.attribute, v.name))
}

/// Declare the `var` namespace right after the first `<svg` token, unless
/// a declaration is already present.
pub fn add_variables_namespace(text: &str) -> Cow<'_, str> {
    if has_variables_namespace(text) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replacen(
        "<svg",
        &format!(r#"<svg xmlns:var="{VARIABLES_NAMESPACE}""#),
        1,
    ))
}
