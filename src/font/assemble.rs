//! Font assembly: one ordered glyph set plus naming metadata in, one
//! font binary out, in either glyph model.
//!
//! The two models deliberately derive their horizontal bearings from
//! different sources. The outline model reads each glyph's stored
//! bounding box; the charstring model replays the charstring deltas and
//! measures. The assembler never crosses those streams.

use crate::core::config::{NameStrings, VerticalMetrics};
use crate::font::cff::{build_cff, CffNames};
use crate::font::draw::GlyphRepresentation;
use crate::font::glyf::build_glyf_loca;
use crate::font::tables::{
    build_cmap, build_head, build_hhea, build_hmtx, build_maxp_charstring, build_maxp_outline,
    build_name, build_os2, build_post, long_date_time, GlyphMetrics, Os2Params, SfntBuilder,
    FLAVOR_CFF, FLAVOR_TRUETYPE,
};
use crate::geometry::Bounds;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One glyph slot in final glyph order.
pub struct NamedGlyph {
    pub name: String,
    pub representation: Arc<GlyphRepresentation>,
}

/// Everything needed to emit one output font: glyph order (slot zero is
/// the missing-glyph sentinel), the character map in glyph ids, and the
/// font-wide metadata.
pub struct FontAssembly {
    pub names: NameStrings,
    pub units_per_em: u16,
    pub metrics: VerticalMetrics,
    pub lowest_rec_ppem: u16,
    pub is_fixed_pitch: bool,
    /// Unix seconds, fixed once per build so every artifact of a run
    /// agrees on its creation time.
    pub timestamp: i64,
    pub glyphs: Vec<NamedGlyph>,
    pub character_map: BTreeMap<u32, u16>,
}

impl FontAssembly {
    /// Emit the outline-model binary.
    pub fn build_outline_font(&self) -> Vec<u8> {
        let outlines: Vec<_> = self
            .glyphs
            .iter()
            .map(|g| &g.representation.outline)
            .collect();
        let (glyf, loca) = build_glyf_loca(&outlines);

        // Bearings come from the stored glyph bounding boxes.
        let glyph_metrics: Vec<GlyphMetrics> = self
            .glyphs
            .iter()
            .map(|g| GlyphMetrics {
                advance: g.representation.advance,
                lsb: g.representation.outline.x_min(),
                bounds: g.representation.outline.bounds,
            })
            .collect();

        let max_points = outlines.iter().map(|o| o.point_count()).max().unwrap_or(0);
        let max_contours = outlines.iter().map(|o| o.contours.len()).max().unwrap_or(0);

        let mut sfnt = SfntBuilder::new(FLAVOR_TRUETYPE);
        sfnt.add(
            *b"head",
            build_head(
                self.units_per_em,
                font_bounds(&glyph_metrics),
                self.lowest_rec_ppem,
                1, // long loca
                long_date_time(self.timestamp),
            ),
        );
        sfnt.add(
            *b"maxp",
            build_maxp_outline(
                self.glyphs.len() as u16,
                max_points as u16,
                max_contours as u16,
            ),
        );
        sfnt.add(*b"glyf", glyf);
        sfnt.add(*b"loca", loca);
        self.add_shared_tables(&mut sfnt, &glyph_metrics);
        sfnt.build()
    }

    /// Emit the charstring-model binary.
    pub fn build_charstring_font(&self) -> Vec<u8> {
        // Bearings come from replaying the charstrings.
        let glyph_metrics: Vec<GlyphMetrics> = self
            .glyphs
            .iter()
            .map(|g| {
                let bounds = g.representation.charstring.compute_bounds();
                GlyphMetrics {
                    advance: g.representation.advance,
                    lsb: bounds.x_min as i16,
                    bounds,
                }
            })
            .collect();

        let glyph_names: Vec<String> = self.glyphs.iter().map(|g| g.name.clone()).collect();
        let charstrings: Vec<_> = self
            .glyphs
            .iter()
            .map(|g| g.representation.charstring.clone())
            .collect();
        let cff = build_cff(
            &CffNames {
                postscript_name: self.names.postscript_name.clone(),
                full_name: self.names.full_name.clone(),
                family_name: self.names.family_name.clone(),
                notice: self.names.copyright.clone(),
            },
            self.units_per_em,
            &glyph_names,
            &charstrings,
        );

        let mut sfnt = SfntBuilder::new(FLAVOR_CFF);
        sfnt.add(
            *b"head",
            build_head(
                self.units_per_em,
                font_bounds(&glyph_metrics),
                self.lowest_rec_ppem,
                0,
                long_date_time(self.timestamp),
            ),
        );
        sfnt.add(*b"maxp", build_maxp_charstring(self.glyphs.len() as u16));
        sfnt.add(*b"CFF ", cff);
        self.add_shared_tables(&mut sfnt, &glyph_metrics);
        sfnt.build()
    }

    fn add_shared_tables(&self, sfnt: &mut SfntBuilder, glyph_metrics: &[GlyphMetrics]) {
        sfnt.add(*b"hhea", build_hhea(self.metrics, glyph_metrics));
        sfnt.add(*b"hmtx", build_hmtx(glyph_metrics));
        sfnt.add(*b"cmap", build_cmap(&self.character_map));
        sfnt.add(*b"name", build_name(&self.names));
        sfnt.add(
            *b"OS/2",
            build_os2(&Os2Params {
                units_per_em: self.units_per_em,
                metrics: self.metrics,
                avg_char_width: average_advance(glyph_metrics),
                first_char_index: self
                    .character_map
                    .keys()
                    .next()
                    .map(|&cp| cp.min(0xFFFF) as u16)
                    .unwrap_or(0),
                last_char_index: self
                    .character_map
                    .keys()
                    .next_back()
                    .map(|&cp| cp.min(0xFFFF) as u16)
                    .unwrap_or(0),
            }),
        );
        sfnt.add(*b"post", build_post(self.units_per_em, self.is_fixed_pitch));
    }
}

fn font_bounds(glyphs: &[GlyphMetrics]) -> Bounds {
    let mut all = glyphs.iter().map(|g| g.bounds);
    let mut bounds = all.next().unwrap_or(Bounds {
        x_min: 0,
        y_min: 0,
        x_max: 0,
        y_max: 0,
    });
    for b in all {
        bounds.x_min = bounds.x_min.min(b.x_min);
        bounds.y_min = bounds.y_min.min(b.y_min);
        bounds.x_max = bounds.x_max.max(b.x_max);
        bounds.y_max = bounds.y_max.max(b.y_max);
    }
    bounds
}

fn average_advance(glyphs: &[GlyphMetrics]) -> i16 {
    if glyphs.is_empty() {
        return 0;
    }
    let total: i64 = glyphs.iter().map(|g| g.advance as i64).sum();
    (total / glyphs.len() as i64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{FontConfig, SizeMode};
    use crate::design::{DesignFile, DesignKey, PixelGrid};
    use crate::font::draw::draw_glyph;
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

    fn assembly() -> FontAssembly {
        let cfg = config();
        let draw = |rows: &[&[u8]]| {
            let file = DesignFile {
                key: DesignKey::Notdef,
                flavors: BTreeSet::new(),
                grid: PixelGrid::from_rows(rows),
                source_id: "test".into(),
            };
            Arc::new(draw_glyph(&file, &cfg, SizeMode::Monospaced))
        };
        let notdef = draw(&[&[1, 1], &[1, 0], &[1, 1], &[0, 0]]);
        let a = draw(&[&[0, 0], &[1, 1], &[1, 1], &[0, 0]]);
        let glyphs = vec![
            NamedGlyph {
                name: ".notdef".into(),
                representation: notdef,
            },
            NamedGlyph {
                name: "uni0041".into(),
                representation: a,
            },
        ];
        FontAssembly {
            names: NameStrings {
                copyright: "(c) test".into(),
                family_name: "Forge 4px".into(),
                style_name: "Regular".into(),
                unique_identifier: "Forge-4px;1.0".into(),
                full_name: "Forge 4px".into(),
                version: "1.0.0-20240101".into(),
                postscript_name: "Forge-4px-Regular".into(),
                designer: String::new(),
                description: String::new(),
                vendor_url: String::new(),
                designer_url: String::new(),
                license_description: String::new(),
                license_info_url: String::new(),
            },
            units_per_em: 400,
            metrics: cfg.metrics(SizeMode::Monospaced),
            lowest_rec_ppem: 4,
            is_fixed_pitch: true,
            timestamp: 0,
            glyphs,
            character_map: [(0x41u32, 1u16)].into(),
        }
    }

    fn table_tags(font: &[u8]) -> Vec<[u8; 4]> {
        let n = u16::from_be_bytes([font[4], font[5]]) as usize;
        (0..n)
            .map(|i| {
                let at = 12 + 16 * i;
                [font[at], font[at + 1], font[at + 2], font[at + 3]]
            })
            .collect()
    }

    #[test]
    fn outline_font_carries_the_truetype_table_set() {
        let font = assembly().build_outline_font();
        assert_eq!(&font[0..4], &FLAVOR_TRUETYPE.to_be_bytes());
        let tags = table_tags(&font);
        for tag in [b"cmap", b"glyf", b"head", b"hhea", b"hmtx", b"loca", b"maxp", b"name", b"post"]
        {
            assert!(tags.contains(tag), "missing table {:?}", tag);
        }
        assert!(tags.contains(b"OS/2"));
        assert!(!tags.contains(b"CFF "));
    }

    #[test]
    fn charstring_font_swaps_glyf_for_cff() {
        let font = assembly().build_charstring_font();
        assert_eq!(&font[0..4], b"OTTO");
        let tags = table_tags(&font);
        assert!(tags.contains(b"CFF "));
        assert!(!tags.contains(b"glyf"));
        assert!(!tags.contains(b"loca"));
    }

    #[test]
    fn both_models_agree_on_advances_and_bearings_here() {
        // For freshly traced pixel glyphs the stored boxes and the
        // replayed charstrings describe the same geometry, so hmtx must
        // come out identical.
        let assembly = assembly();
        let ttf = assembly.build_outline_font();
        let otf = assembly.build_charstring_font();
        let hmtx = |font: &[u8]| {
            let n = u16::from_be_bytes([font[4], font[5]]) as usize;
            (0..n)
                .find_map(|i| {
                    let at = 12 + 16 * i;
                    if &font[at..at + 4] == b"hmtx" {
                        let off = u32::from_be_bytes([
                            font[at + 8],
                            font[at + 9],
                            font[at + 10],
                            font[at + 11],
                        ]) as usize;
                        let len = u32::from_be_bytes([
                            font[at + 12],
                            font[at + 13],
                            font[at + 14],
                            font[at + 15],
                        ]) as usize;
                        Some(font[off..off + len].to_vec())
                    } else {
                        None
                    }
                })
                .unwrap()
        };
        assert_eq!(hmtx(&ttf), hmtx(&otf));
    }

    #[test]
    fn head_dates_count_from_the_sfnt_epoch() {
        // The assembly timestamp is Unix seconds; head.created/modified
        // count from 1904-01-01, 2_082_844_800 seconds earlier.
        let mut assembly = assembly();
        assembly.timestamp = 1_700_000_000;
        let font = assembly.build_outline_font();
        let n = u16::from_be_bytes([font[4], font[5]]) as usize;
        let head_offset = (0..n)
            .find_map(|i| {
                let at = 12 + 16 * i;
                (&font[at..at + 4] == b"head").then(|| {
                    u32::from_be_bytes([font[at + 8], font[at + 9], font[at + 10], font[at + 11]])
                        as usize
                })
            })
            .unwrap();
        let created = i64::from_be_bytes(font[head_offset + 20..head_offset + 28].try_into().unwrap());
        assert_eq!(created, 1_700_000_000 + 2_082_844_800);
    }

    #[test]
    fn whole_file_checksum_holds_for_both_models() {
        use crate::font::writer::checksum;
        let assembly = assembly();
        assert_eq!(checksum(&assembly.build_outline_font()), 0xB1B0_AFBA);
        assert_eq!(checksum(&assembly.build_charstring_font()), 0xB1B0_AFBA);
    }
}
