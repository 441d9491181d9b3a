//! Charstring-model glyph encoding: Type 2 charstrings inside a `CFF `
//! table.
//!
//! The charstring keeps only relative moves and lines; the assembler
//! derives each glyph's bearings and the font bounding box by replaying
//! those deltas, never by consulting a stored box.

use crate::font::writer::ByteWriter;
use crate::geometry::{Bounds, Contour, Point};

const OP_RLINETO: u8 = 5;
const OP_ENDCHAR: u8 = 14;
const OP_RMOVETO: u8 = 21;

/// One relative drawing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharStringOp {
    MoveTo { dx: i32, dy: i32 },
    LineTo { dx: i32, dy: i32 },
}

/// A drawn glyph in the charstring model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharString {
    pub width: u16,
    pub ops: Vec<CharStringOp>,
}

impl CharString {
    /// Convert closed contours to relative steps. Each contour opens with
    /// a move from the previous contour's last vertex (or the origin) and
    /// closes implicitly.
    pub fn from_contours(width: u16, contours: &[Contour]) -> CharString {
        let mut ops = Vec::new();
        let mut current = Point::new(0, 0);
        for contour in contours {
            let mut points = contour.points.iter();
            if let Some(&first) = points.next() {
                ops.push(CharStringOp::MoveTo {
                    dx: first.x - current.x,
                    dy: first.y - current.y,
                });
                current = first;
            }
            for &p in points {
                ops.push(CharStringOp::LineTo {
                    dx: p.x - current.x,
                    dy: p.y - current.y,
                });
                current = p;
            }
        }
        CharString { width, ops }
    }

    /// Replay the deltas and box every vertex reached. This is the
    /// charstring model's only geometry source for metrics.
    pub fn compute_bounds(&self) -> Bounds {
        let mut current = Point::new(0, 0);
        let mut bounds: Option<Bounds> = None;
        for op in &self.ops {
            let (CharStringOp::MoveTo { dx, dy } | CharStringOp::LineTo { dx, dy }) = *op;
            current = Point::new(current.x + dx, current.y + dy);
            match bounds.as_mut() {
                Some(b) => b.include(current),
                None => bounds = Some(Bounds::of_point(current)),
            }
        }
        bounds.unwrap_or(Bounds {
            x_min: 0,
            y_min: 0,
            x_max: 0,
            y_max: 0,
        })
    }

    /// Encode as a Type 2 charstring: advance width first (the nominal
    /// width is zero), then moves and runs of lines, then `endchar`.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        push_number(&mut w, self.width as i32);
        let mut i = 0;
        while i < self.ops.len() {
            match self.ops[i] {
                CharStringOp::MoveTo { dx, dy } => {
                    push_number(&mut w, dx);
                    push_number(&mut w, dy);
                    w.u8(OP_RMOVETO);
                    i += 1;
                }
                CharStringOp::LineTo { .. } => {
                    // Batch consecutive lines, bounded by the 48-operand
                    // argument stack.
                    let mut taken = 0;
                    while taken < 24 {
                        match self.ops.get(i + taken) {
                            Some(CharStringOp::LineTo { dx, dy }) => {
                                push_number(&mut w, *dx);
                                push_number(&mut w, *dy);
                                taken += 1;
                            }
                            _ => break,
                        }
                    }
                    w.u8(OP_RLINETO);
                    i += taken;
                }
            }
        }
        w.u8(OP_ENDCHAR);
        w.into_bytes()
    }
}

/// Type 2 operand encoding. Every coordinate in an em of a few thousand
/// units fits the 16-bit form.
fn push_number(w: &mut ByteWriter, v: i32) {
    if (-107..=107).contains(&v) {
        w.u8((v + 139) as u8);
    } else if (108..=1131).contains(&v) {
        let v = v - 108;
        w.u8(247 + (v >> 8) as u8);
        w.u8((v & 0xFF) as u8);
    } else if (-1131..=-108).contains(&v) {
        let v = -v - 108;
        w.u8(251 + (v >> 8) as u8);
        w.u8((v & 0xFF) as u8);
    } else {
        w.u8(28);
        w.i16(v as i16);
    }
}

/// Fixed-width DICT integer (operator 29). Using the five-byte form for
/// every operand keeps the Top DICT length independent of the offset
/// values it carries.
fn push_dict_number(w: &mut ByteWriter, v: i32) {
    w.u8(29);
    w.i32(v);
}

/// DICT real number (operator 30), nibble-encoded from the shortest
/// round-trip decimal form.
fn push_dict_real(w: &mut ByteWriter, v: f64) {
    w.u8(30);
    let mut nibbles: Vec<u8> = format!("{v}")
        .bytes()
        .map(|b| match b {
            b'0'..=b'9' => b - b'0',
            b'.' => 0x0A,
            b'-' => 0x0E,
            _ => 0x0F,
        })
        .collect();
    nibbles.push(0x0F);
    if nibbles.len() % 2 == 1 {
        nibbles.push(0x0F);
    }
    for pair in nibbles.chunks(2) {
        w.u8((pair[0] << 4) | pair[1]);
    }
}

fn index(items: &[Vec<u8>]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.u16(items.len() as u16);
    if items.is_empty() {
        return w.into_bytes();
    }
    let total: usize = items.iter().map(Vec::len).sum();
    let off_size: u8 = match total + 1 {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        _ => 4,
    };
    w.u8(off_size);
    let mut offset = 1usize;
    let mut push_offset = |w: &mut ByteWriter, offset: usize| match off_size {
        1 => w.u8(offset as u8),
        2 => w.u16(offset as u16),
        _ => w.u32(offset as u32),
    };
    push_offset(&mut w, offset);
    for item in items {
        offset += item.len();
        push_offset(&mut w, offset);
    }
    for item in items {
        w.extend(item);
    }
    w.into_bytes()
}

/// Font-wide strings referenced from the Top DICT.
#[derive(Debug, Clone)]
pub struct CffNames {
    pub postscript_name: String,
    pub full_name: String,
    pub family_name: String,
    pub notice: String,
}

// First custom string identifier after the standard strings.
const CUSTOM_SID_BASE: u16 = 391;

// Offset-bearing tail of the Top DICT: charset, CharStrings and Private
// entries with five-byte integer operands.
const TOP_DICT_TAIL_LEN: usize = (5 + 1) + (5 + 1) + (5 + 5 + 1);

/// Assemble a complete `CFF ` table. Glyph zero must be `.notdef`; the
/// remaining glyph names become custom charset strings. The FontMatrix
/// scales charstring units down by `units_per_em`, so charstrings in
/// design units render at the same size as the outline-model tables.
pub fn build_cff(
    names: &CffNames,
    units_per_em: u16,
    glyph_names: &[String],
    charstrings: &[CharString],
) -> Vec<u8> {
    let header: [u8; 4] = [1, 0, 4, 4];
    let name_index = index(&[names.postscript_name.clone().into_bytes()]);

    // Custom strings in SID order: notice, full name, family name, then
    // the charset names of every glyph after .notdef.
    let mut strings: Vec<Vec<u8>> = vec![
        names.notice.clone().into_bytes(),
        names.full_name.clone().into_bytes(),
        names.family_name.clone().into_bytes(),
    ];
    strings.extend(glyph_names.iter().skip(1).map(|n| n.clone().into_bytes()));
    let string_index = index(&strings);

    let global_subr_index = index(&[]);

    let mut charset = ByteWriter::new();
    charset.u8(0); // format 0: one SID per glyph after .notdef
    for i in 1..glyph_names.len() {
        charset.u16(CUSTOM_SID_BASE + 3 + (i as u16 - 1));
    }
    let charset = charset.into_bytes();

    let charstrings_data: Vec<Vec<u8>> = charstrings.iter().map(CharString::encode).collect();
    let charstrings_index = index(&charstrings_data);

    let mut private_dict = ByteWriter::new();
    push_dict_number(&mut private_dict, 0);
    private_dict.u8(20); // defaultWidthX
    push_dict_number(&mut private_dict, 0);
    private_dict.u8(21); // nominalWidthX
    let private_dict = private_dict.into_bytes();

    // Leading Top DICT entries carry no offsets, so their encoded length
    // is known before the section offsets are; the offset-bearing tail
    // uses fixed-width operands.
    let mut top_dict = ByteWriter::new();
    push_dict_number(&mut top_dict, CUSTOM_SID_BASE as i32);
    top_dict.u8(1); // Notice
    push_dict_number(&mut top_dict, CUSTOM_SID_BASE as i32 + 1);
    top_dict.u8(2); // FullName
    push_dict_number(&mut top_dict, CUSTOM_SID_BASE as i32 + 2);
    top_dict.u8(3); // FamilyName
    let scale = 1.0 / units_per_em as f64;
    push_dict_real(&mut top_dict, scale);
    push_dict_number(&mut top_dict, 0);
    push_dict_number(&mut top_dict, 0);
    push_dict_real(&mut top_dict, scale);
    push_dict_number(&mut top_dict, 0);
    push_dict_number(&mut top_dict, 0);
    top_dict.u8(12);
    top_dict.u8(7); // FontMatrix

    let top_dict_len = top_dict.len() + TOP_DICT_TAIL_LEN;
    // One item whose offsets fit a single byte.
    let top_dict_index_len = 2 + 1 + 2 + top_dict_len;
    debug_assert!(top_dict_len + 1 <= 0xFF);

    let charset_offset = header.len()
        + name_index.len()
        + top_dict_index_len
        + string_index.len()
        + global_subr_index.len();
    let charstrings_offset = charset_offset + charset.len();
    let private_offset = charstrings_offset + charstrings_index.len();

    push_dict_number(&mut top_dict, charset_offset as i32);
    top_dict.u8(15); // charset
    push_dict_number(&mut top_dict, charstrings_offset as i32);
    top_dict.u8(17); // CharStrings
    push_dict_number(&mut top_dict, private_dict.len() as i32);
    push_dict_number(&mut top_dict, private_offset as i32);
    top_dict.u8(18); // Private
    let top_dict = top_dict.into_bytes();
    debug_assert_eq!(top_dict.len(), top_dict_len);
    let top_dict_index = index(&[top_dict]);
    debug_assert_eq!(top_dict_index.len(), top_dict_index_len);

    let mut out = ByteWriter::new();
    out.extend(&header);
    out.extend(&name_index);
    out.extend(&top_dict_index);
    out.extend(&string_index);
    out.extend(&global_subr_index);
    out.extend(&charset);
    out.extend(&charstrings_index);
    out.extend(&private_dict);
    out.into_bytes()
}
