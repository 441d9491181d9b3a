//! Filesystem edges of the pipeline: decoding and re-encoding design
//! bitmaps, walking design trees, relocating files to their canonical
//! classified paths, and writing finished font binaries.

use crate::core::errors::ForgeError;
use crate::design::classify::{canonical_relative_path, parse_file_name};
use crate::design::grid::FOREGROUND;
use crate::design::{DesignFile, PixelGrid};
use crate::unicode::blocks::BlockTable;
use image::{Rgba, RgbaImage};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A design file together with the on-disk location it was decoded from,
/// so the normalization pass can rewrite it in place.
#[derive(Debug, Clone)]
pub struct LoadedDesign {
    pub path: PathBuf,
    pub file: DesignFile,
}

/// Decode one authored bitmap. The file name carries the glyph identity;
/// the alpha channel carries coverage (anything above half opacity is
/// foreground).
pub fn decode_design_file(path: &Path) -> Result<DesignFile, ForgeError> {
    let name = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| ForgeError::MalformedFileName {
            name: path.display().to_string(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;
    let parsed = parse_file_name(name)?;
    let source_id = path.display().to_string();

    let image = image::open(path)
        .map_err(|err| ForgeError::BitmapDecode {
            source_id: source_id.clone(),
            reason: err.to_string(),
        })?
        .into_rgba8();
    let (width, height) = image.dimensions();
    let samples = image
        .pixels()
        .map(|p| if p.0[3] > 127 { FOREGROUND } else { 0 })
        .collect();

    Ok(DesignFile {
        key: parsed.key,
        flavors: parsed.flavors,
        grid: PixelGrid::from_samples(width, height, samples),
        source_id,
    })
}

/// Write a design bitmap in canonical form: opaque black foreground on a
/// fully transparent background.
pub fn encode_design_file(file: &DesignFile, path: &Path) -> Result<(), ForgeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut image = RgbaImage::new(file.width(), file.height());
    for y in 0..file.height() {
        for x in 0..file.width() {
            let pixel = if file.grid.is_foreground(x, y) {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            };
            image.put_pixel(x, y, pixel);
        }
    }
    image.save(path).map_err(|err| ForgeError::BitmapEncode {
        source_id: path.display().to_string(),
        reason: err.to_string(),
    })
}

/// Decode every bitmap under one size-mode directory, in a deterministic
/// depth-first order. A missing directory is an empty layer.
pub fn load_design_layer(mode_dir: &Path) -> Result<Vec<LoadedDesign>, ForgeError> {
    let mut paths = Vec::new();
    if mode_dir.is_dir() {
        collect_png_files(mode_dir, &mut paths)?;
    }
    let mut designs = Vec::with_capacity(paths.len());
    for path in paths {
        designs.push(LoadedDesign {
            file: decode_design_file(&path)?,
            path,
        });
    }
    debug!(
        dir = %mode_dir.display(),
        count = designs.len(),
        "loaded design layer"
    );
    Ok(designs)
}

fn collect_png_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ForgeError> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_png_files(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Move every bitmap under a size-mode directory to its canonical
/// classified path, canonicalizing file names on the way. Renames go
/// through a temporary name so case-only moves survive case-insensitive
/// filesystems. Returns the number of files moved.
pub fn classify_design_dir(mode_dir: &Path, blocks: &BlockTable) -> Result<usize, ForgeError> {
    let mut paths = Vec::new();
    if mode_dir.is_dir() {
        collect_png_files(mode_dir, &mut paths)?;
    }
    let mut moved = 0;
    for path in paths {
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| ForgeError::MalformedFileName {
                name: path.display().to_string(),
                reason: "file name is not valid UTF-8".to_string(),
            })?;
        let parsed = parse_file_name(name)?;
        let target = mode_dir.join(canonical_relative_path(
            blocks,
            parsed.key,
            &parsed.flavors,
        )?);
        if target == path {
            continue;
        }
        if target.exists() && !same_file(&path, &target) {
            return Err(ForgeError::MalformedFileName {
                name: name.to_string(),
                reason: format!(
                    "canonical location `{}` is already occupied",
                    target.display()
                ),
            });
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = target.with_extension("png.relocating");
        fs::rename(&path, &staging)?;
        fs::rename(&staging, &target)?;
        info!(from = %path.display(), to = %target.display(), "classified design file");
        moved += 1;
    }
    if mode_dir.is_dir() {
        prune_empty_dirs(mode_dir)?;
    }
    Ok(moved)
}

/// Whether two paths name the same existing file. Case-only renames on
/// case-insensitive filesystems make the old and new path coexist.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Remove directories left empty by relocation. The root itself is kept.
fn prune_empty_dirs(dir: &Path) -> Result<(), ForgeError> {
    fn prune(dir: &Path) -> io::Result<bool> {
        let mut empty = true;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() && prune(&path)? {
                fs::remove_dir(&path)?;
            } else {
                empty = false;
            }
        }
        Ok(empty)
    }
    prune(dir)?;
    Ok(())
}

/// Write one finished font binary into the outputs directory.
pub fn write_artifact(
    outputs_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, ForgeError> {
    fs::create_dir_all(outputs_dir)?;
    let path = outputs_dir.join(file_name);
    fs::write(&path, bytes)?;
    info!(path = %path.display(), size = bytes.len(), "wrote font artifact");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignKey;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn save_png(path: &Path, width: u32, height: u32, foreground: &[(u32, u32)]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut image = RgbaImage::new(width, height);
        for &(x, y) in foreground {
            image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
        image.save(path).unwrap();
    }

    fn blocks() -> BlockTable {
        BlockTable::parse(
            "0000..007F; Basic Latin\n\
             4E00..9FFF; CJK Unified Ideographs\n",
        )
        .unwrap()
    }

    #[test]
    fn decodes_identity_and_alpha_coverage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0041 ja.png");
        save_png(&path, 2, 2, &[(0, 0), (1, 1)]);
        let file = decode_design_file(&path).unwrap();
        assert_eq!(file.key, DesignKey::CodePoint(0x41));
        assert!(file.flavors.contains(&crate::core::config::LocaleFlavor::Ja));
        assert!(file.grid.is_foreground(0, 0));
        assert!(!file.grid.is_foreground(1, 0));
        assert!(file.grid.is_foreground(1, 1));
    }

    #[test]
    fn encode_then_decode_preserves_the_grid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0042.png");
        let file = DesignFile {
            key: DesignKey::CodePoint(0x42),
            flavors: BTreeSet::new(),
            grid: PixelGrid::from_rows(&[&[FOREGROUND, 0], &[0, FOREGROUND]]),
            source_id: "test".into(),
        };
        encode_design_file(&file, &path).unwrap();
        let decoded = decode_design_file(&path).unwrap();
        assert_eq!(decoded.grid, file.grid);
    }

    #[test]
    fn layer_loading_is_recursive_and_ordered() {
        let dir = tempdir().unwrap();
        save_png(&dir.path().join("b/0042.png"), 1, 1, &[]);
        save_png(&dir.path().join("a/0041.png"), 1, 1, &[]);
        save_png(&dir.path().join("notdef.png"), 1, 1, &[]);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let layer = load_design_layer(dir.path()).unwrap();
        let keys: Vec<_> = layer.iter().map(|d| d.file.key).collect();
        assert_eq!(
            keys,
            vec![
                DesignKey::CodePoint(0x41),
                DesignKey::CodePoint(0x42),
                DesignKey::Notdef
            ]
        );
    }

    #[test]
    fn missing_layer_directory_is_empty() {
        let dir = tempdir().unwrap();
        let layer = load_design_layer(&dir.path().join("absent")).unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn classification_moves_files_to_canonical_paths() {
        let dir = tempdir().unwrap();
        // Misfiled, lower-case CJK glyph at the root.
        save_png(&dir.path().join("4e2d.png"), 1, 1, &[]);
        // Already canonical.
        save_png(
            &dir.path().join("0000-007F Basic Latin/0041.png"),
            1,
            1,
            &[],
        );
        let moved = classify_design_dir(dir.path(), &blocks()).unwrap();
        assert_eq!(moved, 1);
        assert!(dir
            .path()
            .join("4E00-9FFF CJK Unified Ideographs/4E-/4E2D.png")
            .is_file());
        assert!(!dir.path().join("4e2d.png").exists());
        // Idempotent on the second run.
        assert_eq!(classify_design_dir(dir.path(), &blocks()).unwrap(), 0);
    }

    #[test]
    fn classification_prunes_emptied_directories() {
        let dir = tempdir().unwrap();
        save_png(&dir.path().join("wrong-block/0041.png"), 1, 1, &[]);
        classify_design_dir(dir.path(), &blocks()).unwrap();
        assert!(dir.path().join("0000-007F Basic Latin/0041.png").is_file());
        assert!(!dir.path().join("wrong-block").exists());
    }

    #[test]
    fn occupied_canonical_location_is_an_error() {
        let dir = tempdir().unwrap();
        save_png(&dir.path().join("0041.png"), 1, 1, &[]);
        save_png(
            &dir.path().join("0000-007F Basic Latin/0041.png"),
            1,
            1,
            &[],
        );
        assert!(classify_design_dir(dir.path(), &blocks()).is_err());
    }

    #[test]
    fn artifacts_land_in_the_outputs_directory() {
        let dir = tempdir().unwrap();
        let outputs = dir.path().join("build/outputs");
        let path = write_artifact(&outputs, "forge-12px-monospaced-none.ttf", b"font").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"font");
    }
}
