//! Font and workspace configuration
//!
//! Static font parameters (pixel size, baseline offsets, unit-subdivision
//! factor) are validated once when the workspace file is loaded; the rest
//! of the pipeline treats a [`FontConfig`] as immutable truth.

use crate::core::errors::ForgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The two canvas layouts a glyph bitmap can be authored in.
///
/// Monospaced bitmaps fill a fixed square cell; proportional bitmaps use a
/// taller canvas that already includes the line spacing above and below
/// the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeMode {
    Monospaced,
    Proportional,
}

impl SizeMode {
    pub const ALL: [SizeMode; 2] = [SizeMode::Monospaced, SizeMode::Proportional];

    /// Lower-case token used in directory layouts and output file names.
    pub fn as_str(self) -> &'static str {
        match self {
            SizeMode::Monospaced => "monospaced",
            SizeMode::Proportional => "proportional",
        }
    }

    /// Capitalized form used in font display names.
    pub fn title(self) -> &'static str {
        match self {
            SizeMode::Monospaced => "Monospaced",
            SizeMode::Proportional => "Proportional",
        }
    }
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A regional glyph-shape variant selectable per output font.
///
/// `None` is the base flavor: its design map carries no overrides. Design
/// files never declare `none` explicitly; a file with an empty flavor list
/// is a common glyph shared by every flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocaleFlavor {
    None,
    ZhHans,
    ZhHant,
    Ja,
    Ko,
}

impl LocaleFlavor {
    pub const ALL: [LocaleFlavor; 5] = [
        LocaleFlavor::None,
        LocaleFlavor::ZhHans,
        LocaleFlavor::ZhHant,
        LocaleFlavor::Ja,
        LocaleFlavor::Ko,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            LocaleFlavor::None => "none",
            LocaleFlavor::ZhHans => "zh_hans",
            LocaleFlavor::ZhHant => "zh_hant",
            LocaleFlavor::Ja => "ja",
            LocaleFlavor::Ko => "ko",
        }
    }

    /// Parse a flavor tag from a design file name. The base tag `none` is
    /// not a valid file tag: commonness is expressed by omitting the list.
    pub fn parse_tag(tag: &str) -> Option<LocaleFlavor> {
        match tag {
            "zh_hans" => Some(LocaleFlavor::ZhHans),
            "zh_hant" => Some(LocaleFlavor::ZhHant),
            "ja" => Some(LocaleFlavor::Ja),
            "ko" => Some(LocaleFlavor::Ko),
            _ => None,
        }
    }
}

impl fmt::Display for LocaleFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Ascent/descent pair in font design units. `descent` is negative or
/// zero, measured down from the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub ascent: i32,
    pub descent: i32,
}

fn default_em_dot_size() -> u32 {
    100
}

/// Immutable parameters for one pixel size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Monospaced cell size in pixels (also the em size in pixels).
    pub px: u32,
    /// Baseline offset from the top of the monospaced cell, in pixels.
    pub monospaced_origin_y_px: u32,
    /// Total canvas height of proportional bitmaps, in pixels.
    pub proportional_design_px: u32,
    /// Baseline offset from the top of the proportional canvas, in pixels.
    pub proportional_origin_y_px: u32,
    /// Font design units per pixel.
    #[serde(default = "default_em_dot_size")]
    pub em_dot_size: u32,
}

impl FontConfig {
    /// Line height in pixels: `2 * proportional_origin_y_px - px`.
    pub fn line_height_px(&self) -> u32 {
        2 * self.proportional_origin_y_px - self.px
    }

    pub fn units_per_em(&self) -> u32 {
        self.px * self.em_dot_size
    }

    /// Baseline offset (from the canvas top) for the given size mode.
    pub fn origin_y_px(&self, size_mode: SizeMode) -> u32 {
        match size_mode {
            SizeMode::Monospaced => self.monospaced_origin_y_px,
            SizeMode::Proportional => self.proportional_origin_y_px,
        }
    }

    /// Required bitmap height for the given size mode.
    pub fn design_height_px(&self, size_mode: SizeMode) -> u32 {
        match size_mode {
            SizeMode::Monospaced => self.px,
            SizeMode::Proportional => self.line_height_px(),
        }
    }

    pub fn metrics(&self, size_mode: SizeMode) -> VerticalMetrics {
        let s = self.em_dot_size as i32;
        match size_mode {
            SizeMode::Monospaced => VerticalMetrics {
                ascent: self.monospaced_origin_y_px as i32 * s,
                descent: (self.monospaced_origin_y_px as i32 - self.px as i32) * s,
            },
            SizeMode::Proportional => VerticalMetrics {
                ascent: self.proportional_origin_y_px as i32 * s,
                descent: (self.px as i32 - self.proportional_origin_y_px as i32) * s,
            },
        }
    }

    /// Reject inconsistent configurations up front, before any geometry
    /// checks could trip over them later.
    pub fn validate(&self) -> Result<(), ForgeError> {
        let fail = |reason: String| ForgeError::InvalidFontConfig {
            px: self.px,
            reason,
        };
        if self.px == 0 || self.px % 2 != 0 {
            return Err(fail(format!(
                "cell size must be a positive even number of pixels, got {}",
                self.px
            )));
        }
        if self.em_dot_size == 0 {
            return Err(fail("em_dot_size must be positive".to_string()));
        }
        if self.monospaced_origin_y_px == 0 || self.monospaced_origin_y_px > self.px {
            return Err(fail(format!(
                "monospaced baseline {} must lie inside the {}px cell",
                self.monospaced_origin_y_px, self.px
            )));
        }
        if self.proportional_origin_y_px < self.px {
            return Err(fail(format!(
                "proportional baseline {} would make the line height smaller than the {}px cell",
                self.proportional_origin_y_px, self.px
            )));
        }
        let line_height = self.line_height_px();
        if self.proportional_design_px != line_height {
            return Err(fail(format!(
                "proportional_design_px is {} but 2 * {} - {} = {}",
                self.proportional_design_px, self.proportional_origin_y_px, self.px, line_height
            )));
        }
        Ok(())
    }
}

/// Font naming metadata, copied verbatim into the binaries' naming table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Human-readable family stem, e.g. `Forge Pixel`.
    pub display_name: String,
    /// Identifier-safe stem used for unique and PostScript names.
    pub unique_name: String,
    /// Lower-case stem used in output file names.
    pub output_name: String,
    pub style_name: String,
    /// Version stem; the build date is appended at build time.
    pub version_name: String,
    pub copyright: String,
    pub designer: String,
    pub description: String,
    pub vendor_url: String,
    pub designer_url: String,
    pub license_description: String,
    pub license_info_url: String,
}

impl NamingConfig {
    /// Full version string, `<version_name>-<YYYYMMDD>`.
    pub fn version(&self) -> String {
        format!(
            "{}-{}",
            self.version_name,
            chrono::Utc::now().format("%Y%m%d")
        )
    }

    pub fn display_name(&self, px: u32, size_mode: SizeMode, flavor: LocaleFlavor) -> String {
        format!(
            "{} {}px {} {}",
            self.display_name,
            px,
            size_mode.title(),
            flavor.tag()
        )
    }

    pub fn unique_name(&self, px: u32, size_mode: SizeMode, flavor: LocaleFlavor) -> String {
        format!(
            "{}-{}px-{}-{}",
            self.unique_name,
            px,
            size_mode.title(),
            flavor.tag()
        )
    }

    pub fn output_file_name(
        &self,
        px: u32,
        size_mode: SizeMode,
        flavor: LocaleFlavor,
        ext: &str,
    ) -> String {
        format!(
            "{}-{}px-{}-{}.{}",
            self.output_name,
            px,
            size_mode.as_str(),
            flavor.tag(),
            ext
        )
    }

    /// Resolve the full fixed-field naming record for one output font.
    pub fn name_strings(&self, px: u32, size_mode: SizeMode, flavor: LocaleFlavor) -> NameStrings {
        let display = self.display_name(px, size_mode, flavor);
        let unique = self.unique_name(px, size_mode, flavor);
        let version = self.version();
        NameStrings {
            copyright: self.copyright.clone(),
            family_name: display.clone(),
            style_name: self.style_name.clone(),
            unique_identifier: format!("{}-{};{}", unique, self.style_name, version),
            full_name: display,
            version,
            postscript_name: format!("{}-{}", unique, self.style_name),
            designer: self.designer.clone(),
            description: self.description.clone(),
            vendor_url: self.vendor_url.clone(),
            designer_url: self.designer_url.clone(),
            license_description: self.license_description.clone(),
            license_info_url: self.license_info_url.clone(),
        }
    }
}

/// Fully resolved naming-table strings for one (px, size mode, flavor).
#[derive(Debug, Clone)]
pub struct NameStrings {
    pub copyright: String,
    pub family_name: String,
    pub style_name: String,
    pub unique_identifier: String,
    pub full_name: String,
    pub version: String,
    pub postscript_name: String,
    pub designer: String,
    pub description: String,
    pub vendor_url: String,
    pub designer_url: String,
    pub license_description: String,
    pub license_info_url: String,
}

/// Top-level workspace description, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Roots that hold authored designs, laid out `<dir>/<px>/<size mode>/`.
    pub design_dirs: Vec<PathBuf>,
    /// Where assembled font binaries are written.
    pub outputs_dir: PathBuf,
    /// Unicode block range data in `Blocks.txt` format.
    pub blocks_file: PathBuf,
    pub naming: NamingConfig,
    pub fonts: Vec<FontConfig>,
}

impl WorkspaceConfig {
    /// Load and validate a workspace file. Every contained `FontConfig`
    /// must pass validation; a bad config fails the whole load.
    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        let contents = fs::read_to_string(path)?;
        let config: WorkspaceConfig =
            serde_json::from_str(&contents).map_err(|source| ForgeError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        for font in &config.fonts {
            font.validate()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_10px() -> FontConfig {
        FontConfig {
            px: 10,
            monospaced_origin_y_px: 8,
            proportional_design_px: 14,
            proportional_origin_y_px: 12,
            em_dot_size: 100,
        }
    }

    #[test]
    fn line_height_follows_proportional_baseline() {
        let config = config_10px();
        assert_eq!(config.line_height_px(), 14, "2 * 12 - 10 should be 14");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mismatched_proportional_design_height_is_rejected_at_config_time() {
        // cellSize = 10, proportionalOrigin = 8 gives lineHeight 6; any
        // other proportional_design_px must fail validation, not surface
        // later as a geometry error.
        let config = FontConfig {
            px: 10,
            monospaced_origin_y_px: 8,
            proportional_design_px: 10,
            proportional_origin_y_px: 8,
            em_dot_size: 100,
        };
        assert_eq!(config.line_height_px(), 6);
        assert!(matches!(
            config.validate(),
            Err(ForgeError::InvalidFontConfig { px: 10, .. })
        ));
    }

    #[test]
    fn proportional_canvas_never_shorter_than_cell() {
        let config = FontConfig {
            px: 10,
            monospaced_origin_y_px: 8,
            proportional_design_px: 6,
            proportional_origin_y_px: 8,
            em_dot_size: 100,
        };
        // proportional_origin_y_px < px is rejected before the design
        // height is even compared.
        assert!(config.validate().is_err());
    }

    #[test]
    fn odd_cell_size_is_rejected() {
        let mut config = config_10px();
        config.px = 9;
        assert!(config.validate().is_err(), "half-width glyphs need px/2 exact");
    }

    #[test]
    fn metrics_differ_per_size_mode() {
        let config = config_10px();
        assert_eq!(config.units_per_em(), 1000);
        let mono = config.metrics(SizeMode::Monospaced);
        assert_eq!(mono.ascent, 800);
        assert_eq!(mono.descent, -200);
        let prop = config.metrics(SizeMode::Proportional);
        assert_eq!(prop.ascent, 1200);
        assert_eq!(prop.descent, -200);
    }

    #[test]
    fn output_names_follow_the_product_pattern() {
        let naming = NamingConfig {
            display_name: "Forge Pixel".to_string(),
            unique_name: "Forge-Pixel".to_string(),
            output_name: "forge-pixel".to_string(),
            style_name: "Regular".to_string(),
            version_name: "0.1.0".to_string(),
            copyright: String::new(),
            designer: String::new(),
            description: String::new(),
            vendor_url: String::new(),
            designer_url: String::new(),
            license_description: String::new(),
            license_info_url: String::new(),
        };
        assert_eq!(
            naming.output_file_name(10, SizeMode::Monospaced, LocaleFlavor::ZhHans, "otf"),
            "forge-pixel-10px-monospaced-zh_hans.otf"
        );
        let names = naming.name_strings(10, SizeMode::Proportional, LocaleFlavor::Ja);
        assert_eq!(names.family_name, "Forge Pixel 10px Proportional ja");
        assert!(names.postscript_name.starts_with("Forge-Pixel-10px-Proportional-ja"));
    }
}
