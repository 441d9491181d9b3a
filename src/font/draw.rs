//! Drawing a design file into both glyph models, with a content-hash
//! cache so identical bitmaps under the same placement are traced once.

use crate::core::config::{FontConfig, SizeMode};
use crate::design::DesignFile;
use crate::font::cff::CharString;
use crate::font::glyf::OutlineGlyph;
use crate::geometry::trace::trace_outline;
use crate::geometry::transform::to_font_space;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

/// One glyph rendered through both drawing protocols, sharing a single
/// traced outline.
#[derive(Debug)]
pub struct GlyphRepresentation {
    pub outline: OutlineGlyph,
    pub charstring: CharString,
    pub advance: u16,
}

/// Trace, transform and encode one design file for the given size mode.
pub fn draw_glyph(file: &DesignFile, config: &FontConfig, mode: SizeMode) -> GlyphRepresentation {
    let traced = trace_outline(&file.grid);
    let contours = to_font_space(&traced, config.origin_y_px(mode), config.em_dot_size);
    let advance = (file.width() * config.em_dot_size) as u16;
    GlyphRepresentation {
        outline: OutlineGlyph::new(contours.clone()),
        charstring: CharString::from_contours(advance, &contours),
        advance,
    }
}

/// Cache keyed by bitmap content and placement. Each entry holds a
/// once-cell so concurrent lookups of the same key trace at most once
/// while distinct keys draw in parallel.
#[derive(Debug, Default)]
pub struct GlyphCache {
    entries: Mutex<HashMap<u64, Arc<OnceLock<Arc<GlyphRepresentation>>>>>,
}

impl GlyphCache {
    pub fn new() -> GlyphCache {
        GlyphCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached representation for this file's bitmap, drawing
    /// it on first use.
    pub fn get_or_draw(
        &self,
        file: &DesignFile,
        config: &FontConfig,
        mode: SizeMode,
    ) -> Arc<GlyphRepresentation> {
        let key = cache_key(file, config, mode);
        let cell = {
            let mut entries = match self.entries.lock() {
                Ok(entries) => entries,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(entries.entry(key).or_default())
        };
        Arc::clone(cell.get_or_init(|| Arc::new(draw_glyph(file, config, mode))))
    }
}

fn cache_key(file: &DesignFile, config: &FontConfig, mode: SizeMode) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    file.grid.content_hash().hash(&mut hasher);
    config.origin_y_px(mode).hash(&mut hasher);
    config.em_dot_size.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LocaleFlavor;
    use crate::design::{DesignKey, PixelGrid};
    use std::collections::BTreeSet;

    fn config() -> FontConfig {
        FontConfig {
            px: 4,
            monospaced_origin_y_px: 3,
            proportional_design_px: 6,
            proportional_origin_y_px: 5,
            em_dot_size: 100,
        }
    }

    fn file(rows: &[&[u8]]) -> DesignFile {
        DesignFile {
            key: DesignKey::CodePoint(0x41),
            flavors: BTreeSet::<LocaleFlavor>::new(),
            grid: PixelGrid::from_rows(rows),
            source_id: "test".into(),
        }
    }

    #[test]
    fn both_models_come_from_one_traced_outline() {
        // One pixel on the second row of a half-width 4px glyph.
        let f = file(&[&[0, 0], &[1, 0], &[0, 0], &[0, 0]]);
        let glyph = draw_glyph(&f, &config(), SizeMode::Monospaced);
        assert_eq!(glyph.advance, 200);
        assert_eq!(glyph.outline.contours.len(), 1);
        // Pixel row 1 sits two pixels above the baseline at origin 3.
        assert_eq!(glyph.outline.bounds.y_max, 200);
        assert_eq!(glyph.outline.bounds.y_min, 100);
        let b = glyph.charstring.compute_bounds();
        assert_eq!(b.y_max, 200);
        assert_eq!(glyph.charstring.width, 200);
    }

    #[test]
    fn cache_reuses_identical_bitmaps_across_keys() {
        let cache = GlyphCache::new();
        let a = file(&[&[1, 0], &[0, 0], &[0, 0], &[0, 0]]);
        let mut b = a.clone();
        b.key = DesignKey::CodePoint(0x42);
        let cfg = config();
        let first = cache.get_or_draw(&a, &cfg, SizeMode::Monospaced);
        let second = cache.get_or_draw(&b, &cfg, SizeMode::Monospaced);
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn placement_participates_in_the_cache_key() {
        // The same bitmap drawn under the two modes must cache
        // separately because the baseline differs.
        let cache = GlyphCache::new();
        let mono = file(&[&[1, 0], &[0, 0], &[0, 0], &[0, 0]]);
        let prop = file(&[
            &[0, 0],
            &[0, 0],
            &[1, 0],
            &[0, 0],
            &[0, 0],
            &[0, 0],
        ]);
        let cfg = config();
        cache.get_or_draw(&mono, &cfg, SizeMode::Monospaced);
        cache.get_or_draw(&prop, &cfg, SizeMode::Proportional);
        assert_eq!(cache.len(), 2);
    }
}
