//! East-Asian width classification for monospaced width validation.
//!
//! The validator only needs to know whether a character must occupy half
//! a cell, a full cell, or may use either. Wide/fullwidth and ambiguous
//! classes come from `unicode-width` (a character is ambiguous exactly
//! when its CJK-context width differs from its default width); the strict
//! narrow classes are the printable ASCII range and the halfwidth
//! compatibility forms.

use std::fmt;
use unicode_width::UnicodeWidthChar;

/// Required monospaced bitmap width, as a fraction of the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthRequirement {
    /// Exactly `cell / 2` pixels (narrow and halfwidth classes).
    Half,
    /// Exactly `cell` pixels (wide and fullwidth classes).
    Full,
    /// Either width (ambiguous and neutral classes, and the missing-glyph
    /// sentinel, which has no assigned character).
    Either,
}

impl fmt::Display for WidthRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidthRequirement::Half => "half-width",
            WidthRequirement::Full => "full-width",
            WidthRequirement::Either => "flexible-width",
        };
        f.write_str(name)
    }
}

/// Halfwidth compatibility characters: Won sign plus the halfwidth block
/// of Halfwidth and Fullwidth Forms.
fn is_halfwidth_form(c: char) -> bool {
    matches!(c, '\u{20A9}' | '\u{FF61}'..='\u{FFDC}' | '\u{FFE8}'..='\u{FFEE}')
}

/// Classify one character. `None` stands for the missing-glyph sentinel.
pub fn width_requirement(c: Option<char>) -> WidthRequirement {
    let Some(c) = c else {
        return WidthRequirement::Either;
    };
    let default_width = c.width();
    let cjk_width = c.width_cjk();
    if default_width != cjk_width {
        // East-Asian-ambiguous characters render at either width.
        return WidthRequirement::Either;
    }
    match default_width {
        Some(2) => WidthRequirement::Full,
        Some(_) if c.is_ascii_graphic() || c == ' ' || is_halfwidth_form(c) => {
            WidthRequirement::Half
        }
        _ => WidthRequirement::Either,
    }
}
