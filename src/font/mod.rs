//! Font binary construction: the two glyph-geometry encodings, the
//! shared sfnt tables, the glyph drawer with its per-build cache, and
//! the WOFF2 transport container.

pub mod assemble;
pub mod cff;
pub mod draw;
pub mod glyf;
pub mod tables;
pub mod woff2;
pub mod writer;
