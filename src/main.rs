// src/main.rs

mod cli;

use anyhow::{Context, Result};
use booster::{
    BoosterConfig, CliProgress, LogProgress, PassReport, ProgressTracker, ShadowTree,
    SilentProgress, check_file,
};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => BoosterConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => BoosterConfig::default(),
    };

    match cli.command {
        Commands::Decompress { root } => {
            let tree = open_tree(&root, &config)?;
            let progress = pass_progress("Decompressing", cli.quiet);
            let report = tree.decompress_all_with_progress(progress.as_ref())?;
            progress.finish_with_message("Decompress pass complete");
            finish_pass(&report)
        }
        Commands::Recompress { root } => {
            let tree = open_tree(&root, &config)?;
            let progress = pass_progress("Recompressing", cli.quiet);
            let report = tree.recompress_all_with_progress(progress.as_ref())?;
            progress.finish_with_message("Recompress pass complete");
            finish_pass(&report)
        }
        Commands::View { root } => {
            let tree = open_tree(&root, &config)?;
            for path in tree.logical_view()? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Check { file } => {
            let verdict = check_file(&file, &config.codec)
                .with_context(|| format!("Failed to check {}", file.display()))?;
            match verdict {
                None => println!("not-gzip"),
                Some(verdict) => println!(
                    "{} ({} compressed bytes, {} plaintext bytes)",
                    if verdict.transparent {
                        "transparent"
                    } else {
                        "not-transparent"
                    },
                    verdict.compressed_len,
                    verdict.plaintext_len
                ),
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "booster", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn open_tree(root: &Path, config: &BoosterConfig) -> Result<ShadowTree> {
    ShadowTree::with_config(root, config)
        .with_context(|| format!("Cannot use {} as a tree root", root.display()))
}

fn pass_progress(name: &str, quiet: bool) -> Box<dyn ProgressTracker> {
    if quiet {
        Box::new(SilentProgress::new())
    } else if std::io::stderr().is_terminal() {
        Box::new(CliProgress::new(name, 0))
    } else {
        // Redirected output gets periodic log lines instead of a bar
        Box::new(LogProgress::new(name, 0))
    }
}

fn finish_pass(report: &PassReport) -> Result<()> {
    println!("{}", report);
    for err in &report.errors {
        eprintln!("  {}", err);
    }
    if !report.is_clean() {
        anyhow::bail!("{} file(s) failed", report.errors.len());
    }
    Ok(())
}
