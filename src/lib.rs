//! Glyphforge
//!
//! Compiles libraries of hand-authored pixel-art glyph bitmaps into
//! installable vector fonts (TrueType outlines, CFF charstrings, and a
//! WOFF2 transport variant), with monospaced and proportional size modes
//! and per-locale glyph substitution.
pub mod core;
pub mod design;
pub mod font;
pub mod geometry;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod unicode;
