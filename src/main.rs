use anyhow::Context;
use clap::Parser;
use glyphforge::core::cli::CliArgs;
use glyphforge::core::config::WorkspaceConfig;
use glyphforge::{logging, pipeline};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    if let Err(message) = args.validate() {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
    logging::init();

    let workspace = WorkspaceConfig::load(&args.config)
        .with_context(|| format!("loading workspace `{}`", args.config.display()))?;

    if args.classify {
        let moved = pipeline::classify_workspace(&workspace)?;
        info!(moved, "design tree classified");
    }

    let mut built = 0usize;
    for config in &workspace.fonts {
        if !args.px.is_empty() && !args.px.contains(&config.px) {
            continue;
        }
        let fonts = pipeline::build_font_config(&workspace, config)
            .with_context(|| format!("building {}px fonts", config.px))?;
        built += fonts.len();
    }
    if built == 0 && !args.px.is_empty() {
        anyhow::bail!(
            "no configured font matches --px {:?}; configured sizes: {:?}",
            args.px,
            workspace.fonts.iter().map(|f| f.px).collect::<Vec<_>>()
        );
    }
    info!(fonts = built, "build complete");
    Ok(())
}
