//! Shared types used across all pipeline stages.
//!
//! These types flow from discovery (scan) through assembly, style generation
//! and optimization, and back out to the CLI for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One discovered input file.
///
/// `location` is the path the file was found at, as a display string; it is
/// what prefix strategies receive and what warnings refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub location: String,
    pub content: String,
}

impl Source {
    pub fn new(location: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            content: content.into(),
        }
    }
}

/// A source after naming has been applied. Recomputed every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteItem {
    pub location: String,
    /// Globally unique identifier within one spritemap (prefix + idified name).
    pub identifier: String,
    /// Identifier before prefixing: the file stem.
    pub name: String,
    /// Display string used for generated `<title>` elements.
    pub title: String,
    /// Source text, with the variables namespace injected when needed.
    pub content: String,
}

/// What a [`Warning`] is about.
///
/// Per-sprite kinds exclude one sprite from the output; pass-level kinds
/// describe option combinations that produce surprising output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    EmptySource,
    UnparsableSource,
    MissingRootElement,
    InsufficientSizing,
    IncompatibleOptions,
    IdentifierCollision,
    DuplicateIdentifier,
    VariablesUnsupported,
    VariablesWithFragment,
    FragmentWithoutView,
    FragmentWithHashedFilename,
    DefaultValueMismatch,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::EmptySource => "empty-source",
            WarningKind::UnparsableSource => "unparsable-source",
            WarningKind::MissingRootElement => "missing-root-element",
            WarningKind::InsufficientSizing => "insufficient-sizing",
            WarningKind::IncompatibleOptions => "incompatible-options",
            WarningKind::IdentifierCollision => "identifier-collision",
            WarningKind::DuplicateIdentifier => "duplicate-identifier",
            WarningKind::VariablesUnsupported => "variables-unsupported",
            WarningKind::VariablesWithFragment => "variables-with-fragment",
            WarningKind::FragmentWithoutView => "fragment-without-view",
            WarningKind::FragmentWithHashedFilename => "fragment-with-hashed-filename",
            WarningKind::DefaultValueMismatch => "default-value-mismatch",
        }
    }
}

/// A recoverable problem found during a generation pass. Never thrown.
///
/// Warnings are collected and surfaced by the caller; creating one only
/// emits a debug event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        let warning = Self {
            kind,
            message: message.into(),
        };
        tracing::debug!(kind = kind.as_str(), "{}", warning.message);
        warning
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}
