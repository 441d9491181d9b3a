//! Design file validation and normalization
//!
//! Enforces the per-glyph geometric constraints (width class, exact
//! height, reserved CJK margins) and snaps the grid to its canonical
//! encoding. A file that fails any rule aborts the enclosing build; a
//! malformed glyph must never reach font assembly.

use crate::core::config::{FontConfig, SizeMode};
use crate::core::errors::{ForgeError, GeometryRule};
use crate::design::{DesignFile, DesignKey};
use crate::unicode::width::{width_requirement, WidthRequirement};
use std::ops::RangeInclusive;

/// The one code-point range whose monospaced designs must reserve a blank
/// top row and a blank rightmost column inside the authored cell.
const CJK_MARGIN_RANGE: RangeInclusive<u32> = 0x4E00..=0x9FFF;

/// Validate one design file against its owning config and size mode,
/// then normalize the grid encoding. Returns true when normalization
/// changed the stored samples, so callers can skip rewriting files that
/// were already canonical.
pub fn validate_and_normalize(
    file: &mut DesignFile,
    config: &FontConfig,
    size_mode: SizeMode,
) -> Result<bool, ForgeError> {
    let geometry_error = |rule: GeometryRule| ForgeError::InvalidGlyphGeometry {
        source_id: file.source_id.clone(),
        rule,
    };

    if size_mode == SizeMode::Monospaced {
        let class = width_requirement(file.key.to_char());
        let width = file.width();
        let half = config.px / 2;
        let ok = match class {
            WidthRequirement::Half => width == half,
            WidthRequirement::Full => width == config.px,
            WidthRequirement::Either => width == half || width == config.px,
        };
        if !ok {
            return Err(geometry_error(GeometryRule::WidthClass {
                class,
                cell_px: config.px,
                actual: width,
            }));
        }
    }

    let expected_height = config.design_height_px(size_mode);
    if file.height() != expected_height {
        return Err(geometry_error(GeometryRule::Height {
            expected: expected_height,
            actual: file.height(),
        }));
    }

    if size_mode == SizeMode::Monospaced {
        if let DesignKey::CodePoint(cp) = file.key {
            if CJK_MARGIN_RANGE.contains(&cp) {
                if file.grid.row(0).iter().any(|&sample| sample != 0) {
                    return Err(geometry_error(GeometryRule::MarginTopRow));
                }
                for y in 0..file.height() {
                    if file.grid.is_foreground(file.width() - 1, y) {
                        return Err(geometry_error(GeometryRule::MarginRightColumn { row: y }));
                    }
                }
            }
        }
    }

    Ok(file.grid.normalize())
}
