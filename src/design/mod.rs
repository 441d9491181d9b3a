//! Design files: the authored (and derived) pixel bitmaps, one per glyph
//! per size mode, plus the classification, validation, derivation and
//! collection passes that run over them.

pub mod classify;
pub mod collect;
pub mod grid;
pub mod proportional;
pub mod validate;

pub use grid::PixelGrid;

use crate::core::config::LocaleFlavor;
use std::collections::BTreeSet;
use std::fmt;

/// Identity of one logical glyph within a size-mode bucket: either the
/// missing-glyph sentinel or a Unicode code point.
///
/// Ordering puts the sentinel first, then code points ascending, which is
/// exactly the glyph order required by the font assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DesignKey {
    Notdef,
    CodePoint(u32),
}

impl DesignKey {
    /// Token used in design file names: `notdef` or upper-case hex.
    pub fn file_token(&self) -> String {
        match self {
            DesignKey::Notdef => "notdef".to_string(),
            DesignKey::CodePoint(cp) => format!("{cp:04X}"),
        }
    }

    /// Glyph name used inside font binaries: `.notdef` or `uniXXXX`.
    pub fn glyph_name(&self) -> String {
        match self {
            DesignKey::Notdef => ".notdef".to_string(),
            DesignKey::CodePoint(cp) => format!("uni{cp:04X}"),
        }
    }

    pub fn code_point(&self) -> Option<u32> {
        match self {
            DesignKey::Notdef => None,
            DesignKey::CodePoint(cp) => Some(*cp),
        }
    }

    /// The character this key designs, if it is a valid scalar value.
    pub fn to_char(&self) -> Option<char> {
        self.code_point().and_then(char::from_u32)
    }
}

impl fmt::Display for DesignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignKey::Notdef => f.write_str(".notdef"),
            DesignKey::CodePoint(cp) => write!(f, "U+{cp:04X}"),
        }
    }
}

/// One decoded design bitmap with its parsed identity.
///
/// Created by decoding an authored bitmap, rewritten once by the
/// validator's normalization pass and never mutated afterwards. The
/// proportional deriver supersedes a monospaced file with a new one; it
/// does not modify the original.
#[derive(Debug, Clone)]
pub struct DesignFile {
    pub key: DesignKey,
    /// Applicable locale flavors; empty means a common/base glyph.
    pub flavors: BTreeSet<LocaleFlavor>,
    pub grid: PixelGrid,
    /// Originating file identity, carried for error reports and logs.
    pub source_id: String,
}

impl DesignFile {
    pub fn is_common(&self) -> bool {
        self.flavors.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }
}
