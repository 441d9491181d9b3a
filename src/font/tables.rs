//! The sfnt tables shared by both glyph models, and the container that
//! binds them into a font binary.

use crate::core::config::{NameStrings, VerticalMetrics};
use crate::font::writer::{checksum, ByteWriter};
use crate::geometry::Bounds;
use std::collections::BTreeMap;

pub const FLAVOR_TRUETYPE: u32 = 0x0001_0000;
pub const FLAVOR_CFF: u32 = u32::from_be_bytes(*b"OTTO");

/// Seconds from the sfnt epoch (1904-01-01) to the Unix epoch.
const SFNT_EPOCH_OFFSET: i64 = 2_082_844_800;

pub fn long_date_time(unix_seconds: i64) -> i64 {
    unix_seconds + SFNT_EPOCH_OFFSET
}

/// Horizontal metrics of one glyph plus its bounding box, as derived by
/// the owning glyph model.
#[derive(Debug, Clone, Copy)]
pub struct GlyphMetrics {
    pub advance: u16,
    pub lsb: i16,
    pub bounds: Bounds,
}

pub fn build_head(
    units_per_em: u16,
    font_bounds: Bounds,
    lowest_rec_ppem: u16,
    index_to_loc_format: i16,
    timestamp: i64,
) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.u32(0x0001_0000); // majorVersion.minorVersion
    w.u32(0x0001_0000); // fontRevision
    w.u32(0); // checkSumAdjustment, patched by the container
    w.u32(0x5F0F_3CF5); // magicNumber
    w.u16(0x0003); // flags: baseline at y=0, lsb at x=0
    w.u16(units_per_em);
    w.i64(timestamp); // created
    w.i64(timestamp); // modified
    w.i16(font_bounds.x_min as i16);
    w.i16(font_bounds.y_min as i16);
    w.i16(font_bounds.x_max as i16);
    w.i16(font_bounds.y_max as i16);
    w.u16(0); // macStyle
    w.u16(lowest_rec_ppem);
    w.i16(2); // fontDirectionHint
    w.i16(index_to_loc_format);
    w.i16(0); // glyphDataFormat
    w.into_bytes()
}

pub fn build_hhea(metrics: VerticalMetrics, glyphs: &[GlyphMetrics]) -> Vec<u8> {
    let advance_width_max = glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
    let min_lsb = glyphs.iter().map(|g| g.lsb).min().unwrap_or(0);
    let min_rsb = glyphs
        .iter()
        .map(|g| g.advance as i32 - g.lsb as i32 - (g.bounds.x_max - g.bounds.x_min))
        .min()
        .unwrap_or(0);
    let x_max_extent = glyphs
        .iter()
        .map(|g| g.lsb as i32 + (g.bounds.x_max - g.bounds.x_min))
        .max()
        .unwrap_or(0);

    let mut w = ByteWriter::new();
    w.u32(0x0001_0000);
    w.i16(metrics.ascent as i16);
    w.i16(metrics.descent as i16);
    w.i16(0); // lineGap
    w.u16(advance_width_max);
    w.i16(min_lsb);
    w.i16(min_rsb as i16);
    w.i16(x_max_extent as i16);
    w.i16(1); // caretSlopeRise
    w.i16(0); // caretSlopeRun
    w.i16(0); // caretOffset
    for _ in 0..4 {
        w.i16(0); // reserved
    }
    w.i16(0); // metricDataFormat
    w.u16(glyphs.len() as u16); // numberOfHMetrics: full entries for all
    w.into_bytes()
}

pub fn build_hmtx(glyphs: &[GlyphMetrics]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    for g in glyphs {
        w.u16(g.advance);
        w.i16(g.lsb);
    }
    w.into_bytes()
}

/// Full `maxp` for the outline model.
pub fn build_maxp_outline(num_glyphs: u16, max_points: u16, max_contours: u16) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.u32(0x0001_0000);
    w.u16(num_glyphs);
    w.u16(max_points);
    w.u16(max_contours);
    w.u16(0); // maxCompositePoints
    w.u16(0); // maxCompositeContours
    w.u16(1); // maxZones
    w.u16(0); // maxTwilightPoints
    w.u16(0); // maxStorage
    w.u16(0); // maxFunctionDefs
    w.u16(0); // maxInstructionDefs
    w.u16(0); // maxStackElements
    w.u16(0); // maxSizeOfInstructions
    w.u16(0); // maxComponentElements
    w.u16(0); // maxComponentDepth
    w.into_bytes()
}

/// Short `maxp` for the charstring model.
pub fn build_maxp_charstring(num_glyphs: u16) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.u32(0x0000_5000);
    w.u16(num_glyphs);
    w.into_bytes()
}

/// Character map: a format 4 subtable for the basic plane, plus a
/// format 12 subtable whenever any mapped code point lies above it.
pub fn build_cmap(map: &BTreeMap<u32, u16>) -> Vec<u8> {
    let bmp: BTreeMap<u32, u16> = map
        .iter()
        .filter(|(&cp, _)| cp < 0xFFFF)
        .map(|(&cp, &gid)| (cp, gid))
        .collect();
    let has_supplementary = map.keys().any(|&cp| cp > 0xFFFF);

    let format4 = build_cmap_format4(&bmp);
    let format12 = has_supplementary.then(|| build_cmap_format12(map));

    // Encoding records: Unicode platform first, then Windows, each
    // pointing at the shared subtable bytes.
    let mut records: Vec<(u16, u16, usize)> = Vec::new();
    let mut subtables = Vec::new();
    let format4_index = subtables.len();
    subtables.push(format4);
    records.push((0, 3, format4_index));
    records.push((3, 1, format4_index));
    if let Some(f12) = format12 {
        let format12_index = subtables.len();
        subtables.push(f12);
        records.insert(1, (0, 4, format12_index));
        records.push((3, 10, format12_index));
    }

    let mut offsets = Vec::new();
    let header_len = 4 + 8 * records.len();
    let mut offset = header_len;
    for subtable in &subtables {
        offsets.push(offset);
        offset += subtable.len();
    }

    let mut w = ByteWriter::new();
    w.u16(0); // version
    w.u16(records.len() as u16);
    for &(platform, encoding, index) in &records {
        w.u16(platform);
        w.u16(encoding);
        w.u32(offsets[index] as u32);
    }
    for subtable in &subtables {
        w.extend(subtable);
    }
    w.into_bytes()
}

fn build_cmap_format4(map: &BTreeMap<u32, u16>) -> Vec<u8> {
    // Segments of consecutive code points with consecutive glyph ids.
    let mut segments: Vec<(u16, u16, u16)> = Vec::new(); // (start, end, idDelta)
    let mut run: Option<(u32, u32, u16)> = None; // (start, end, start gid)
    for (&cp, &gid) in map {
        match run {
            Some((start, end, start_gid))
                if cp == end + 1 && gid as u32 == start_gid as u32 + (cp - start) =>
            {
                run = Some((start, cp, start_gid));
            }
            _ => {
                if let Some((start, end, start_gid)) = run {
                    let delta = (start_gid as i32 - start as i32) as u16;
                    segments.push((start as u16, end as u16, delta));
                }
                run = Some((cp, cp, gid));
            }
        }
    }
    if let Some((start, end, start_gid)) = run {
        let delta = (start_gid as i32 - start as i32) as u16;
        segments.push((start as u16, end as u16, delta));
    }
    segments.push((0xFFFF, 0xFFFF, 1)); // required final segment

    let seg_count = segments.len() as u16;
    let search_range = 2 * (1u16 << (15 - (seg_count | 1).leading_zeros() as u16));
    let entry_selector = 15 - (seg_count | 1).leading_zeros() as u16;
    let range_shift = 2 * seg_count - search_range;

    let mut w = ByteWriter::new();
    w.u16(4);
    w.u16(16 + 8 * seg_count); // length, no glyphIdArray
    w.u16(0); // language
    w.u16(seg_count * 2);
    w.u16(search_range);
    w.u16(entry_selector);
    w.u16(range_shift);
    for &(_, end, _) in &segments {
        w.u16(end);
    }
    w.u16(0); // reservedPad
    for &(start, _, _) in &segments {
        w.u16(start);
    }
    for &(_, _, delta) in &segments {
        w.u16(delta);
    }
    for _ in &segments {
        w.u16(0); // idRangeOffsets: deltas only
    }
    w.into_bytes()
}

fn build_cmap_format12(map: &BTreeMap<u32, u16>) -> Vec<u8> {
    let mut groups: Vec<(u32, u32, u32)> = Vec::new(); // (start cp, end cp, start gid)
    for (&cp, &gid) in map {
        match groups.last_mut() {
            Some((start, end, start_gid))
                if cp == *end + 1 && gid as u32 == *start_gid + (cp - *start) =>
            {
                *end = cp;
            }
            _ => groups.push((cp, cp, gid as u32)),
        }
    }
    let mut w = ByteWriter::new();
    w.u16(12);
    w.u16(0); // reserved
    w.u32(16 + 12 * groups.len() as u32);
    w.u32(0); // language
    w.u32(groups.len() as u32);
    for &(start, end, start_gid) in &groups {
        w.u32(start);
        w.u32(end);
        w.u32(start_gid);
    }
    w.into_bytes()
}

/// Naming table, format 0. Every non-empty string is written twice: a
/// Macintosh Roman record and a Windows Unicode BMP record.
pub fn build_name(names: &NameStrings) -> Vec<u8> {
    let entries: [(u16, &str); 13] = [
        (0, &names.copyright),
        (1, &names.family_name),
        (2, &names.style_name),
        (3, &names.unique_identifier),
        (4, &names.full_name),
        (5, &names.version),
        (6, &names.postscript_name),
        (9, &names.designer),
        (10, &names.description),
        (11, &names.vendor_url),
        (12, &names.designer_url),
        (13, &names.license_description),
        (14, &names.license_info_url),
    ];
    let entries: Vec<(u16, &str)> = entries
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect();

    // Records sorted by platform, encoding, language, name id: all the
    // Macintosh records precede the Windows ones.
    let mut records: Vec<(u16, u16, u16, u16, Vec<u8>)> = Vec::new();
    for &(id, value) in &entries {
        let mac: Vec<u8> = value.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect();
        records.push((1, 0, 0, id, mac));
    }
    for &(id, value) in &entries {
        let utf16: Vec<u8> = value.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        records.push((3, 1, 0x0409, id, utf16));
    }

    let mut w = ByteWriter::new();
    w.u16(0);
    w.u16(records.len() as u16);
    w.u16(6 + 12 * records.len() as u16); // stringOffset
    let mut storage = ByteWriter::new();
    for (platform, encoding, language, id, data) in &records {
        w.u16(*platform);
        w.u16(*encoding);
        w.u16(*language);
        w.u16(*id);
        w.u16(data.len() as u16);
        w.u16(storage.len() as u16);
        storage.extend(data);
    }
    w.extend(storage.bytes());
    w.into_bytes()
}

pub struct Os2Params {
    pub units_per_em: u16,
    pub metrics: VerticalMetrics,
    pub avg_char_width: i16,
    pub first_char_index: u16,
    pub last_char_index: u16,
}

/// OS/2 version 4.
pub fn build_os2(params: &Os2Params) -> Vec<u8> {
    let upem = params.units_per_em as i32;
    let mut w = ByteWriter::new();
    w.u16(4);
    w.i16(params.avg_char_width);
    w.u16(400); // usWeightClass
    w.u16(5); // usWidthClass
    w.u16(0); // fsType: installable
    w.i16((upem * 65 / 100) as i16); // ySubscriptXSize
    w.i16((upem * 60 / 100) as i16); // ySubscriptYSize
    w.i16(0); // ySubscriptXOffset
    w.i16((upem * 75 / 1000) as i16); // ySubscriptYOffset
    w.i16((upem * 65 / 100) as i16); // ySuperscriptXSize
    w.i16((upem * 60 / 100) as i16); // ySuperscriptYSize
    w.i16(0); // ySuperscriptXOffset
    w.i16((upem * 35 / 100) as i16); // ySuperscriptYOffset
    w.i16((upem * 5 / 100) as i16); // yStrikeoutSize
    w.i16((upem * 25 / 100) as i16); // yStrikeoutPosition
    w.i16(0); // sFamilyClass
    w.extend(&[0u8; 10]); // panose
    w.u32(0); // ulUnicodeRange1
    w.u32(0);
    w.u32(0);
    w.u32(0);
    w.tag(*b"NONE"); // achVendID
    w.u16(0x0040); // fsSelection: REGULAR
    w.u16(params.first_char_index);
    w.u16(params.last_char_index);
    w.i16(params.metrics.ascent as i16); // sTypoAscender
    w.i16(params.metrics.descent as i16); // sTypoDescender
    w.i16(0); // sTypoLineGap
    w.u16(params.metrics.ascent.max(0) as u16); // usWinAscent
    w.u16((-params.metrics.descent).max(0) as u16); // usWinDescent
    w.u32(1); // ulCodePageRange1: Latin 1
    w.u32(0); // ulCodePageRange2
    w.i16(0); // sxHeight
    w.i16(0); // sCapHeight
    w.u16(0); // usDefaultChar
    w.u16(0x20); // usBreakChar
    w.u16(0); // usMaxContext
    w.into_bytes()
}

/// `post` version 3: no glyph names in the table.
pub fn build_post(units_per_em: u16, is_fixed_pitch: bool) -> Vec<u8> {
    let upem = units_per_em as i32;
    let mut w = ByteWriter::new();
    w.u32(0x0003_0000);
    w.u32(0); // italicAngle
    w.i16((-upem / 10) as i16); // underlinePosition
    w.i16((upem / 20) as i16); // underlineThickness
    w.u32(is_fixed_pitch as u32);
    w.u32(0); // minMemType42
    w.u32(0); // maxMemType42
    w.u32(0); // minMemType1
    w.u32(0); // maxMemType1
    w.into_bytes()
}

/// An sfnt container under construction. Tables are checksummed and
/// sorted by tag; `head.checkSumAdjustment` is patched after the whole
/// file is laid out.
pub struct SfntBuilder {
    flavor: u32,
    tables: Vec<([u8; 4], Vec<u8>)>,
}

impl SfntBuilder {
    pub fn new(flavor: u32) -> SfntBuilder {
        SfntBuilder {
            flavor,
            tables: Vec::new(),
        }
    }

    pub fn add(&mut self, tag: [u8; 4], data: Vec<u8>) {
        self.tables.push((tag, data));
    }

    pub fn build(mut self) -> Vec<u8> {
        self.tables.sort_by_key(|(tag, _)| *tag);
        let n = self.tables.len() as u16;
        let entry_selector = 15 - n.leading_zeros() as u16;
        let search_range = 16 * (1u16 << entry_selector);
        let range_shift = n * 16 - search_range;

        let mut w = ByteWriter::new();
        w.u32(self.flavor);
        w.u16(n);
        w.u16(search_range);
        w.u16(entry_selector);
        w.u16(range_shift);

        let mut offset = 12 + 16 * self.tables.len();
        let mut head_offset = None;
        for (tag, data) in &self.tables {
            w.tag(*tag);
            w.u32(checksum(data));
            w.u32(offset as u32);
            w.u32(data.len() as u32);
            if tag == b"head" {
                head_offset = Some(offset);
            }
            offset += data.len().div_ceil(4) * 4;
        }
        for (_, data) in &self.tables {
            w.extend(data);
            w.pad_to(4);
        }

        let mut bytes = w.into_bytes();
        if let Some(head_offset) = head_offset {
            let adjustment = 0xB1B0_AFBAu32.wrapping_sub(checksum(&bytes));
            bytes[head_offset + 8..head_offset + 12].copy_from_slice(&adjustment.to_be_bytes());
        }
        bytes
    }
}
