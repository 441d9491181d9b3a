//! Error taxonomy for the font build pipeline
//!
//! Every validation failure is fail-fast: it aborts the enclosing
//! `FontConfig` build and carries the offending source identity, the rule
//! violated, and the expected vs. actual values. Nothing is retried and
//! nothing is silently downgraded.

use crate::core::config::LocaleFlavor;
use crate::design::DesignKey;
use crate::unicode::width::WidthRequirement;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("malformed design file name `{name}`: {reason}")]
    MalformedFileName { name: String, reason: String },

    #[error("U+{code_point:04X} is not covered by any known Unicode block")]
    UnknownCodePoint { code_point: u32 },

    #[error("invalid glyph geometry in `{source_id}`: {rule}")]
    InvalidGlyphGeometry {
        source_id: String,
        rule: GeometryRule,
    },

    #[error(
        "duplicate locale override for {key}, flavor `{flavor}`: \
         `{first}` and `{second}` both apply"
    )]
    DuplicateLocaleOverride {
        key: DesignKey,
        flavor: LocaleFlavor,
        first: String,
        second: String,
    },

    /// A merged design map lost an alphabet entry. This is an internal
    /// consistency fault in the collector, not a user input error.
    #[error("design map for flavor `{flavor}` is missing required glyph {key}")]
    MissingRequiredGlyph { flavor: LocaleFlavor, key: DesignKey },

    #[error("invalid font config ({px}px): {reason}")]
    InvalidFontConfig { px: u32, reason: String },

    #[error("malformed Unicode block data at line {line}: {reason}")]
    MalformedBlockData { line: usize, reason: String },

    #[error("failed to decode design bitmap `{source_id}`: {reason}")]
    BitmapDecode { source_id: String, reason: String },

    #[error("failed to encode design bitmap `{source_id}`: {reason}")]
    BitmapEncode { source_id: String, reason: String },

    #[error("failed to parse workspace config `{path}`")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The specific geometric rule an invalid design file violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryRule {
    /// Bitmap width does not match the character's East-Asian-width class.
    WidthClass {
        class: WidthRequirement,
        cell_px: u32,
        actual: u32,
    },
    /// Bitmap height does not match the size mode's required height.
    Height { expected: u32, actual: u32 },
    /// CJK monospaced margin: the top row must be fully background.
    MarginTopRow,
    /// CJK monospaced margin: the rightmost column must be background.
    MarginRightColumn { row: u32 },
}

impl fmt::Display for GeometryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryRule::WidthClass {
                class,
                cell_px,
                actual,
            } => {
                let allowed = match class {
                    WidthRequirement::Half => format!("{}", cell_px / 2),
                    WidthRequirement::Full => format!("{cell_px}"),
                    WidthRequirement::Either => format!("{} or {}", cell_px / 2, cell_px),
                };
                write!(
                    f,
                    "width is {actual}px but the {class} width class requires {allowed}px"
                )
            }
            GeometryRule::Height { expected, actual } => {
                write!(f, "height is {actual}px, expected {expected}px")
            }
            GeometryRule::MarginTopRow => {
                write!(f, "CJK margin rule: top row must be fully background")
            }
            GeometryRule::MarginRightColumn { row } => {
                write!(
                    f,
                    "CJK margin rule: rightmost pixel of row {row} must be background"
                )
            }
        }
    }
}
