//! homefeed - newest-first media listings for photo folders
//!
//! A library cache for media folders: scans the active folders, gives each
//! file an effective date (embedded EXIF capture time first, filesystem
//! timestamp otherwise), and serves sorted listings until the folders
//! actually change. Embedded dates are remembered across restarts in a
//! small JSON file so each photo is opened at most once.

pub mod cache;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod library;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cache::MetadataDateCache;
use crate::cli::{Cli, Commands, OutputFormat, ScanOptions};
use crate::config::Config;
use crate::dates::DateResolver;
use crate::error::ExitCode;
use crate::library::LibraryCache;
use crate::output::{JsonImages, JsonLeaves, TextOutput};

/// Run the CLI. Returns the exit code for a completed command.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }
    let color = !cli.no_color && io::stdout().is_terminal();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Images(opts) => list_images(config, &opts, color),
        Commands::Folder(args) => list_folder(config, &args.dir, &args.scan, color),
        Commands::Leaves(opts) => list_leaves(config, &opts, color),
        Commands::CacheInfo => cache_info(&config, color),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::Success)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            Config::try_load_from_path(path)
                .with_context(|| format!("Invalid config file {}", path.display()))
        }
        None => Ok(Config::load()),
    }
}

/// Build the library cache for one CLI invocation.
fn open_library(mut config: Config, opts: &ScanOptions) -> Result<LibraryCache> {
    config.apply_scan_options(opts);
    if config.folders.is_empty() {
        bail!("No library folders configured; pass --folder or set `folders` in the config file");
    }

    let date_cache = MetadataDateCache::load(config.date_cache_path());
    let resolver = DateResolver::with_default_extractor(date_cache);
    let config = Arc::new(config);
    Ok(LibraryCache::new(config.clone(), config, resolver))
}

fn exit_code_for(count: usize) -> ExitCode {
    if count == 0 {
        ExitCode::NoMedia
    } else {
        ExitCode::Success
    }
}

fn apply_limit<T>(items: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(n) if n < items.len() => &items[..n],
        _ => items,
    }
}

fn list_images(config: Config, opts: &ScanOptions, color: bool) -> Result<ExitCode> {
    let library = open_library(config, opts)?;
    let ctx = library.context();
    let snapshot = library.snapshot(&ctx);
    let images = apply_limit(snapshot.images(), opts.limit);
    let code = exit_code_for(images.len());

    let stdout = io::stdout().lock();
    match opts.output {
        OutputFormat::Text => TextOutput::new(color).write_images(stdout, images)?,
        OutputFormat::Json => {
            let summary = library.last_summary().unwrap_or_default();
            JsonImages::new(images, &snapshot, &summary, code).write_to(stdout, true)?;
        }
    }
    Ok(code)
}

fn list_folder(config: Config, dir: &Path, opts: &ScanOptions, color: bool) -> Result<ExitCode> {
    let library = open_library(config, opts)?;
    let ctx = library.context();
    let snapshot = library.snapshot(&ctx);
    let all = library.get_images_by_folder(&ctx, dir);
    let images = apply_limit(all.as_slice(), opts.limit);
    let code = exit_code_for(images.len());

    let stdout = io::stdout().lock();
    match opts.output {
        OutputFormat::Text => TextOutput::new(color).write_images(stdout, images)?,
        OutputFormat::Json => {
            let summary = library.last_summary().unwrap_or_default();
            JsonImages::new(images, &snapshot, &summary, code).write_to(stdout, true)?;
        }
    }
    Ok(code)
}

fn list_leaves(config: Config, opts: &ScanOptions, color: bool) -> Result<ExitCode> {
    let library = open_library(config, opts)?;
    let ctx = library.context();
    let leaves = library.get_leaf_folders(&ctx);
    let leaves = apply_limit(leaves.as_slice(), opts.limit);
    let code = exit_code_for(leaves.len());

    let stdout = io::stdout().lock();
    match opts.output {
        OutputFormat::Text => TextOutput::new(color).write_leaves(stdout, leaves)?,
        OutputFormat::Json => {
            let summary = library.last_summary().unwrap_or_default();
            JsonLeaves::new(leaves, &summary, code).write_to(stdout, true)?;
        }
    }
    Ok(code)
}

fn cache_info(config: &Config, color: bool) -> Result<ExitCode> {
    let path = config.date_cache_path();
    let cache = MetadataDateCache::load(&path);
    let file_size = std::fs::metadata(&path).ok().map(|m| m.len());

    let mut stdout = io::stdout().lock();
    TextOutput::new(color).write_cache_info(&mut stdout, &path, cache.len(), file_size)?;
    writeln!(stdout, "Log level:  {}", logging::current_level_name())?;
    Ok(ExitCode::Success)
}
