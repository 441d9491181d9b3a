//! Alphabet and design map collection
//!
//! Partitions normalized design files into common and locale-specific
//! groups, derives the per-size-mode alphabet, and builds one immutable
//! design map per locale flavor by overlaying that flavor's overrides
//! onto the common entries. The merged maps and alphabets are the
//! read-only export consumed by the font assembler and by reporting
//! collaborators.

use crate::core::config::LocaleFlavor;
use crate::core::errors::ForgeError;
use crate::design::{DesignFile, DesignKey};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Mapping from design key to the bitmap that draws it, for one
/// (size mode, locale flavor).
pub type DesignFileMap = BTreeMap<DesignKey, Arc<DesignFile>>;

/// Collected designs for one size mode.
#[derive(Debug, Clone)]
pub struct ModeCollection {
    /// Sorted base code points. Locale overrides never contribute here.
    pub alphabet: Vec<u32>,
    /// One merged map per flavor; key sets are always a superset of the
    /// alphabet plus the sentinel.
    pub maps: BTreeMap<LocaleFlavor, DesignFileMap>,
}

/// Collect one size mode from precedence-ordered layers (earlier layers
/// are overridden by later ones; within a layer, conflicting locale
/// overrides are a configuration error rather than a scan-order race).
pub fn collect_mode(layers: &[Vec<Arc<DesignFile>>]) -> Result<ModeCollection, ForgeError> {
    let mut common: DesignFileMap = BTreeMap::new();
    let mut locale: HashMap<LocaleFlavor, DesignFileMap> = HashMap::new();

    for layer in layers {
        let mut seen_in_layer: HashSet<(DesignKey, LocaleFlavor)> = HashSet::new();
        for file in layer {
            // The sentinel is always a common entry; flavor tags on it
            // have no effect.
            if file.is_common() || file.key == DesignKey::Notdef {
                common.insert(file.key, Arc::clone(file));
                continue;
            }
            for &flavor in &file.flavors {
                let entries = locale.entry(flavor).or_default();
                if !seen_in_layer.insert((file.key, flavor)) {
                    let first = entries
                        .get(&file.key)
                        .map(|existing| existing.source_id.clone())
                        .unwrap_or_default();
                    return Err(ForgeError::DuplicateLocaleOverride {
                        key: file.key,
                        flavor,
                        first,
                        second: file.source_id.clone(),
                    });
                }
                entries.insert(file.key, Arc::clone(file));
            }
        }
    }

    let alphabet: Vec<u32> = common
        .keys()
        .filter_map(DesignKey::code_point)
        .collect();

    let mut maps = BTreeMap::new();
    for flavor in LocaleFlavor::ALL {
        let mut map = common.clone();
        if let Some(overrides) = locale.get(&flavor) {
            for (key, file) in overrides {
                // Overlay only: an override substitutes the bitmap, it
                // never removes a base glyph.
                map.insert(*key, Arc::clone(file));
            }
        }
        verify_map_complete(flavor, &alphabet, &map)?;
        maps.insert(flavor, map);
    }

    debug!(
        alphabet_len = alphabet.len(),
        "collected design maps for {} flavors",
        maps.len()
    );
    Ok(ModeCollection { alphabet, maps })
}

/// Post-merge invariant: every flavor map covers the sentinel and the
/// full alphabet. A violation is an internal-consistency fault.
fn verify_map_complete(
    flavor: LocaleFlavor,
    alphabet: &[u32],
    map: &DesignFileMap,
) -> Result<(), ForgeError> {
    if !map.contains_key(&DesignKey::Notdef) {
        return Err(ForgeError::MissingRequiredGlyph {
            flavor,
            key: DesignKey::Notdef,
        });
    }
    for &cp in alphabet {
        if !map.contains_key(&DesignKey::CodePoint(cp)) {
            return Err(ForgeError::MissingRequiredGlyph {
                flavor,
                key: DesignKey::CodePoint(cp),
            });
        }
    }
    Ok(())
}
