//! Proportional variant derivation
//!
//! Synthesizes a proportional design file from a validated monospaced
//! one by padding blank rows above and below. Padding counts are pure
//! functions of the font config, so deriving twice from the same source
//! yields identical output. Proportional sources authored directly
//! bypass this step entirely.

use crate::core::config::{FontConfig, SizeMode};
use crate::core::errors::ForgeError;
use crate::design::{validate::validate_and_normalize, DesignFile};
use tracing::debug;

/// Derive the proportional design file for a validated monospaced one.
///
/// The result is re-checked against the proportional height rule; with a
/// validated config this cannot fail, but a failure here would mean the
/// config and the derivation disagree, which must not go unnoticed.
pub fn derive_proportional(
    file: &DesignFile,
    config: &FontConfig,
) -> Result<DesignFile, ForgeError> {
    let above = config.proportional_origin_y_px - config.px;
    let below = config.proportional_design_px - config.proportional_origin_y_px;
    let mut derived = DesignFile {
        key: file.key,
        flavors: file.flavors.clone(),
        grid: file.grid.pad_vertical(above, below),
        source_id: format!("{} (derived proportional)", file.source_id),
    };
    validate_and_normalize(&mut derived, config, SizeMode::Proportional)?;
    debug!(source = %file.source_id, "derived proportional design");
    Ok(derived)
}
