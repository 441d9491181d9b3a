//! Rectangular pixel coverage grids.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Row-major grid of coverage samples, origin top-left. Zero is
/// background; any nonzero sample is foreground.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

/// Canonical foreground sample value after normalization.
pub const FOREGROUND: u8 = 0xFF;

impl PixelGrid {
    /// Build a grid from row-major samples. `samples` must hold exactly
    /// `width * height` entries.
    pub fn from_samples(width: u32, height: u32, samples: Vec<u8>) -> Self {
        assert_eq!(
            samples.len(),
            (width * height) as usize,
            "sample buffer must match the grid dimensions"
        );
        PixelGrid {
            width,
            height,
            samples,
        }
    }

    /// Convenience constructor for tests and small fixtures.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len() as u32);
        let mut samples = Vec::with_capacity((width * height) as usize);
        for row in rows {
            assert_eq!(row.len() as u32, width, "rows must be equal length");
            samples.extend_from_slice(row);
        }
        PixelGrid {
            width,
            height,
            samples,
        }
    }

    pub fn blank(width: u32, height: u32) -> Self {
        PixelGrid {
            width,
            height,
            samples: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = (y * self.width) as usize;
        &self.samples[start..start + self.width as usize]
    }

    pub fn sample(&self, x: u32, y: u32) -> u8 {
        self.samples[(y * self.width + x) as usize]
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.sample(x, y) != 0
    }

    pub fn is_blank(&self) -> bool {
        self.samples.iter().all(|&sample| sample == 0)
    }

    /// Snap every foreground sample to the canonical value. Returns true
    /// if anything changed, so callers can skip rewriting already-normal
    /// files.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for sample in &mut self.samples {
            if *sample != 0 && *sample != FOREGROUND {
                *sample = FOREGROUND;
                changed = true;
            }
        }
        changed
    }

    /// New grid with `above` blank rows prepended and `below` appended.
    pub fn pad_vertical(&self, above: u32, below: u32) -> PixelGrid {
        let height = self.height + above + below;
        let mut samples = Vec::with_capacity((self.width * height) as usize);
        samples.resize((self.width * above) as usize, 0);
        samples.extend_from_slice(&self.samples);
        samples.resize((self.width * height) as usize, 0);
        PixelGrid {
            width: self.width,
            height,
            samples,
        }
    }

    /// Stable content identity covering dimensions and every sample.
    /// Used as the glyph cache key, so bitmaps shared across locales are
    /// traced and drawn once per build.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
