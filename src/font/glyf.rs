//! Outline-model glyph encoding: simple glyphs in the `glyf` table with
//! a long-format `loca` index.

use crate::font::writer::ByteWriter;
use crate::geometry::{bounds, Bounds, Contour};

const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

/// A drawn glyph in the outline model. The bounding box is computed once
/// at construction and stored; the assembler reads the stored `x_min`
/// back as the glyph's left side bearing rather than re-deriving it from
/// the contours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineGlyph {
    pub contours: Vec<Contour>,
    pub bounds: Bounds,
}

impl OutlineGlyph {
    pub fn new(contours: Vec<Contour>) -> OutlineGlyph {
        let bounds = bounds(&contours).unwrap_or(Bounds {
            x_min: 0,
            y_min: 0,
            x_max: 0,
            y_max: 0,
        });
        OutlineGlyph { contours, bounds }
    }

    /// Stored bounding-box left edge, the outline model's bearing source.
    pub fn x_min(&self) -> i16 {
        self.bounds.x_min as i16
    }

    pub fn point_count(&self) -> usize {
        self.contours.iter().map(|c| c.points.len()).sum()
    }

    /// Encode as a simple glyph: contour end points, an empty instruction
    /// stream, per-point flags and delta-compressed coordinates.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.i16(self.contours.len() as i16);
        w.i16(self.bounds.x_min as i16);
        w.i16(self.bounds.y_min as i16);
        w.i16(self.bounds.x_max as i16);
        w.i16(self.bounds.y_max as i16);

        let mut end = 0usize;
        for contour in &self.contours {
            end += contour.points.len();
            w.u16(end as u16 - 1);
        }
        w.u16(0); // no instructions

        let mut flags = Vec::new();
        let mut xs = ByteWriter::new();
        let mut ys = ByteWriter::new();
        let mut prev = (0i32, 0i32);
        for contour in &self.contours {
            for p in &contour.points {
                let dx = p.x - prev.0;
                let dy = p.y - prev.1;
                prev = (p.x, p.y);
                let mut flag = ON_CURVE;
                if dx == 0 {
                    flag |= X_SAME_OR_POSITIVE;
                } else if (-255..=255).contains(&dx) {
                    flag |= X_SHORT;
                    if dx > 0 {
                        flag |= X_SAME_OR_POSITIVE;
                    }
                    xs.u8(dx.unsigned_abs() as u8);
                } else {
                    xs.i16(dx as i16);
                }
                if dy == 0 {
                    flag |= Y_SAME_OR_POSITIVE;
                } else if (-255..=255).contains(&dy) {
                    flag |= Y_SHORT;
                    if dy > 0 {
                        flag |= Y_SAME_OR_POSITIVE;
                    }
                    ys.u8(dy.unsigned_abs() as u8);
                } else {
                    ys.i16(dy as i16);
                }
                flags.push(flag);
            }
        }
        w.extend(&flags);
        w.extend(xs.bytes());
        w.extend(ys.bytes());
        w.pad_to(4);
        w.into_bytes()
    }
}

/// Build the `glyf` table and its long-format `loca` index for the given
/// glyph order.
pub fn build_glyf_loca(glyphs: &[&OutlineGlyph]) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = ByteWriter::new();
    let mut loca = ByteWriter::new();
    loca.u32(0);
    for glyph in glyphs {
        glyf.extend(&glyph.encode());
        loca.u32(glyf.len() as u32);
    }
    (glyf.into_bytes(), loca.into_bytes())
}
