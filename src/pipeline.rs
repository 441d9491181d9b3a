//! Build orchestration: from a workspace config to finished font
//! binaries on disk.
//!
//! One [`FontConfig`] build runs the full chain per size mode: load and
//! validate every design layer, derive the proportional variants from
//! the monospaced sources, collect the alphabet and per-flavor design
//! maps, draw every distinct bitmap once through the shared cache, and
//! assemble the three binaries for each locale flavor.

use crate::core::config::{FontConfig, LocaleFlavor, SizeMode, WorkspaceConfig};
use crate::core::errors::ForgeError;
use crate::design::collect::{collect_mode, DesignFileMap, ModeCollection};
use crate::design::proportional::derive_proportional;
use crate::design::validate::validate_and_normalize;
use crate::design::{DesignFile, DesignKey};
use crate::font::assemble::{FontAssembly, NamedGlyph};
use crate::font::draw::GlyphCache;
use crate::font::woff2;
use crate::io::{
    classify_design_dir, encode_design_file, load_design_layer, write_artifact, LoadedDesign,
};
use crate::unicode::blocks::BlockTable;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// The artifacts written for one (size mode, locale flavor).
#[derive(Debug)]
pub struct BuiltFont {
    pub size_mode: SizeMode,
    pub flavor: LocaleFlavor,
    pub paths: Vec<PathBuf>,
}

/// Re-file every design bitmap of every configured size into its
/// canonical block directory. Returns the number of files moved.
pub fn classify_workspace(workspace: &WorkspaceConfig) -> Result<usize, ForgeError> {
    let blocks = BlockTable::parse(&fs::read_to_string(&workspace.blocks_file)?)?;
    let mut moved = 0;
    for design_dir in &workspace.design_dirs {
        for config in &workspace.fonts {
            for size_mode in SizeMode::ALL {
                let mode_dir = design_dir
                    .join(config.px.to_string())
                    .join(size_mode.as_str());
                moved += classify_design_dir(&mode_dir, &blocks)?;
            }
        }
    }
    info!(moved, "classification pass complete");
    Ok(moved)
}

/// Build every output font of one pixel size.
pub fn build_font_config(
    workspace: &WorkspaceConfig,
    config: &FontConfig,
) -> Result<Vec<BuiltFont>, ForgeError> {
    info!(px = config.px, "building font config");

    // Authored layers in design-dir order; later directories override
    // earlier ones.
    let mut monospaced_layers = Vec::new();
    let mut proportional_layers = Vec::new();
    for design_dir in &workspace.design_dirs {
        let px_dir = design_dir.join(config.px.to_string());
        monospaced_layers.push(load_validated_layer(
            px_dir.join(SizeMode::Monospaced.as_str()),
            config,
            SizeMode::Monospaced,
        )?);
        proportional_layers.push(load_validated_layer(
            px_dir.join(SizeMode::Proportional.as_str()),
            config,
            SizeMode::Proportional,
        )?);
    }

    let monospaced = collect_mode(&monospaced_layers)?;

    // Every monospaced source yields a derived proportional variant;
    // authored proportional layers stack on top and win.
    let mut derived_layers: Vec<Vec<Arc<DesignFile>>> = Vec::new();
    for layer in &monospaced_layers {
        let derived = layer
            .iter()
            .map(|file| derive_proportional(file, config).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        derived_layers.push(derived);
    }
    derived_layers.extend(proportional_layers);
    let proportional = collect_mode(&derived_layers)?;

    info!(
        px = config.px,
        monospaced_alphabet = monospaced.alphabet.len(),
        proportional_alphabet = proportional.alphabet.len(),
        "collected design maps"
    );

    let timestamp = chrono::Utc::now().timestamp();
    let mut built = Vec::new();
    for (size_mode, collection) in [
        (SizeMode::Monospaced, &monospaced),
        (SizeMode::Proportional, &proportional),
    ] {
        built.extend(build_size_mode(
            workspace, config, size_mode, collection, timestamp,
        )?);
    }
    Ok(built)
}

fn build_size_mode(
    workspace: &WorkspaceConfig,
    config: &FontConfig,
    size_mode: SizeMode,
    collection: &ModeCollection,
    timestamp: i64,
) -> Result<Vec<BuiltFont>, ForgeError> {
    let cache = GlyphCache::new();

    // Draw each distinct bitmap once, in parallel, before any flavor
    // assembly starts.
    let mut distinct: HashMap<u64, Arc<DesignFile>> = HashMap::new();
    for map in collection.maps.values() {
        for file in map.values() {
            distinct
                .entry(file.grid.content_hash())
                .or_insert_with(|| Arc::clone(file));
        }
    }
    let distinct: Vec<Arc<DesignFile>> = distinct.into_values().collect();
    distinct.par_iter().for_each(|file| {
        cache.get_or_draw(file, config, size_mode);
    });
    info!(
        px = config.px,
        size_mode = %size_mode,
        distinct_bitmaps = cache.len(),
        "drew glyph representations"
    );

    let flavors: Vec<LocaleFlavor> = collection.maps.keys().copied().collect();
    flavors
        .par_iter()
        .map(|&flavor| {
            assemble_flavor(
                workspace, config, size_mode, flavor, collection, &cache, timestamp,
            )
        })
        .collect()
}

fn assemble_flavor(
    workspace: &WorkspaceConfig,
    config: &FontConfig,
    size_mode: SizeMode,
    flavor: LocaleFlavor,
    collection: &ModeCollection,
    cache: &GlyphCache,
    timestamp: i64,
) -> Result<BuiltFont, ForgeError> {
    // Glyph order is the sentinel followed by the alphabet in ascending
    // code-point order, identical for every flavor. A locale map may
    // carry override-only entries beyond the alphabet; those never
    // become glyphs of their own.
    let map: &DesignFileMap = &collection.maps[&flavor];
    let mut glyph_keys = Vec::with_capacity(collection.alphabet.len() + 1);
    glyph_keys.push(DesignKey::Notdef);
    glyph_keys.extend(collection.alphabet.iter().map(|&cp| DesignKey::CodePoint(cp)));

    let mut glyphs = Vec::with_capacity(glyph_keys.len());
    for key in &glyph_keys {
        let file = map
            .get(key)
            .ok_or(ForgeError::MissingRequiredGlyph { flavor, key: *key })?;
        glyphs.push(NamedGlyph {
            name: key.glyph_name(),
            representation: cache.get_or_draw(file, config, size_mode),
        });
    }
    let character_map: BTreeMap<u32, u16> = collection
        .alphabet
        .iter()
        .enumerate()
        .map(|(i, &cp)| (cp, (i + 1) as u16))
        .collect();

    let assembly = FontAssembly {
        names: workspace.naming.name_strings(config.px, size_mode, flavor),
        units_per_em: config.units_per_em() as u16,
        metrics: config.metrics(size_mode),
        lowest_rec_ppem: config.px as u16,
        is_fixed_pitch: size_mode == SizeMode::Monospaced,
        timestamp,
        glyphs,
        character_map,
    };

    let ttf = assembly.build_outline_font();
    let otf = assembly.build_charstring_font();
    let woff2 = woff2::compress(&otf)?;

    let mut paths = Vec::new();
    for (ext, bytes) in [("ttf", &ttf), ("otf", &otf), ("woff2", &woff2)] {
        let file_name = workspace
            .naming
            .output_file_name(config.px, size_mode, flavor, ext);
        paths.push(write_artifact(&workspace.outputs_dir, &file_name, bytes)?);
    }
    info!(
        px = config.px,
        size_mode = %size_mode,
        flavor = %flavor,
        glyphs = assembly.glyphs.len(),
        "assembled font"
    );
    Ok(BuiltFont {
        size_mode,
        flavor,
        paths,
    })
}

/// Load one authored layer and run validation/normalization over it.
/// Bitmaps whose stored encoding was not canonical are rewritten in
/// place.
fn load_validated_layer(
    mode_dir: PathBuf,
    config: &FontConfig,
    size_mode: SizeMode,
) -> Result<Vec<Arc<DesignFile>>, ForgeError> {
    let mut layer = Vec::new();
    for LoadedDesign { path, mut file } in load_design_layer(&mode_dir)? {
        let changed = validate_and_normalize(&mut file, config, size_mode)?;
        if changed {
            encode_design_file(&file, &path)?;
            info!(path = %path.display(), "rewrote bitmap in canonical form");
        }
        layer.push(Arc::new(file));
    }
    Ok(layer)
}
