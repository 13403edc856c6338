//! nimprofile CLI - NIM model manifest inspection and profile matching

use anyhow::Context;
use clap::Parser;
use nimprofile::config::{CliArgs, Commands, LogFormat, MatchArgs};
use nimprofile::error::NimProfileError;
use nimprofile::manifest::{Manifest, ManifestParser, ProfileManifest};
use nimprofile::output::{summarize, OutputFormat, OutputFormatter};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging; RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match args.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    // Handle result
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    match &args.command {
        Commands::List { manifest } => cmd_list(manifest, args.output),
        Commands::Show {
            manifest,
            profile_id,
        } => cmd_show(manifest, profile_id, args.output),
        Commands::Match {
            manifest,
            criteria,
            ids_only,
        } => cmd_match(manifest, criteria, *ids_only, args.output),
    }
}

fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    let manifest = ManifestParser::parse_file(path)
        .with_context(|| format!("loading manifest {}", path.display()))?;
    info!(path = %path.display(), profiles = manifest.len(), "loaded manifest");
    Ok(manifest)
}

fn cmd_list(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let manifest = load_manifest(path)?;
    let rows = summarize(&manifest, manifest.sorted_ids());
    OutputFormatter::new(format).print_summaries(&rows)?;
    Ok(())
}

fn cmd_show(path: &Path, profile_id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let manifest = load_manifest(path)?;
    let profile = manifest
        .profile(profile_id)
        .ok_or_else(|| NimProfileError::ProfileNotFound(profile_id.to_string()))?;
    OutputFormatter::new(format).print_profile(profile_id, profile)?;
    Ok(())
}

fn cmd_match(
    path: &Path,
    criteria: &MatchArgs,
    ids_only: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let manifest = load_manifest(path)?;
    let spec = criteria.model_spec()?;
    info!(?spec, discovered = ?criteria.discovered_gpus, "matching profiles");

    let selected = manifest.match_profiles(&spec, &criteria.discovered_gpus);
    info!(selected = selected.len(), "matching complete");

    if ids_only {
        for id in &selected {
            println!("{}", id);
        }
        return Ok(());
    }

    let rows = summarize(&manifest, selected.iter().map(String::as_str));
    OutputFormatter::new(format).print_summaries(&rows)?;
    Ok(())
}
