//! Command line interface for the glyphforge build tool
//!
//! Handles parsing command line arguments and provides validation for
//! user inputs before any build work starts.

use clap::Parser;
use std::path::PathBuf;

/// Glyphforge CLI arguments
///
/// Examples:
///   glyphforge                          # Build every configured size
///   glyphforge --px 10 --px 12          # Build only the 10px and 12px configs
///   glyphforge --classify               # Re-file designs into block directories first
///   glyphforge -c fonts/workspace.json  # Use a specific workspace file
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "glyphforge",
    version,
    about = "Compile pixel-art glyph bitmaps into vector fonts",
    long_about = "Glyphforge validates a library of pixel glyph bitmaps, derives \
                  proportional variants, traces every bitmap into vector outlines \
                  and assembles TrueType, CFF and WOFF2 font binaries for each \
                  configured pixel size and locale flavor."
)]
pub struct CliArgs {
    /// Path to the workspace configuration file
    #[clap(
        long = "config",
        short = 'c',
        default_value = "glyphforge.json",
        help = "Workspace configuration file (JSON)"
    )]
    pub config: PathBuf,

    /// Re-file design bitmaps into their canonical Unicode block
    /// directories before building. Safe to re-run: classification is
    /// idempotent on an already-classified tree.
    #[clap(long = "classify", help = "Re-file designs into block directories")]
    pub classify: bool,

    /// Restrict the build to the given pixel sizes. May be repeated;
    /// an empty list builds every configured size.
    #[clap(long = "px", help = "Only build these pixel sizes")]
    pub px: Vec<u32>,
}

impl CliArgs {
    /// Validate the CLI arguments after parsing, so common mistakes fail
    /// with a clear message before the workspace is touched.
    pub fn validate(&self) -> Result<(), String> {
        if !self.config.exists() {
            return Err(format!(
                "Workspace config does not exist: {}\nPass --config with the path to your workspace JSON file.",
                self.config.display()
            ));
        }
        Ok(())
    }
}
