//! Command-line front end for `rootswatch`.
//!
//! ```text
//! rootswatch scan theme.css
//! rootswatch palette --config rootswatch.yaml --format yaml
//! rootswatch legacy --config rootswatch.yaml
//! rootswatch css --config rootswatch.yaml
//! rootswatch invalidate --config rootswatch.yaml
//! ```
//!
//! Commands return their output as a string so they can be tested without
//! capturing stdout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rootswatch::{scan, FileStore, PaletteConfig, PaletteSource};
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rootswatch", version, about = "Derive color palettes from :root custom properties")]
pub struct Cli {
    /// Log cache and rebuild decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the custom properties of a stylesheet's :root block.
    Scan {
        stylesheet: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Print the derived palette.
    Palette {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Print the legacy toolbar color map and grid size.
    Legacy {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Print the editor utility-class CSS.
    Css {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the client color widget settings.
    Widget {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Drop the cached palette.
    Invalidate {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Cache directory [default: <temp dir>/rootswatch].
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Rebuild even if the cache is fresh.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

impl SourceArgs {
    fn open(&self) -> Result<PaletteSource<FileStore>> {
        let mut config = PaletteConfig::load(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?;
        if self.force {
            config.force = true;
        }

        let cache_dir = self
            .cache_dir
            .clone()
            .unwrap_or_else(default_cache_dir);
        let store = FileStore::open(&cache_dir)
            .with_context(|| format!("opening cache {}", cache_dir.display()))?;

        Ok(PaletteSource::new(config, store)?)
    }
}

/// Log filter from a `RUST_LOG`-style directive string.
///
/// Falls back to `warn` when `directives` is absent or invalid. `verbose`
/// raises the level to at least `debug` without lowering a more verbose one.
pub fn log_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    let filter = directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let below_debug = filter
        .max_level_hint()
        .map_or(true, |level| level < LevelFilter::DEBUG);
    if verbose && below_debug {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}

/// `<temp dir>/rootswatch`.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("rootswatch")
}

/// Runs a parsed command and returns what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Command::Scan { stylesheet, format } => {
            let css = read(stylesheet)?;
            let declarations =
                scan(&css).with_context(|| format!("parsing {}", stylesheet.display()))?;
            render(&declarations, *format)
        }
        Command::Palette { source, format } => render(&source.open()?.palette()?, *format),
        Command::Legacy { source, format } => render(&source.open()?.legacy()?, *format),
        Command::Css { source } => Ok(source.open()?.palette()?.editor_css()),
        Command::Widget { source } => render(&source.open()?.widget_settings()?, Format::Json),
        Command::Invalidate { source } => {
            let source = source.open()?;
            source.invalidate();
            Ok(format!(
                "invalidated cache for {}\n",
                source.stylesheet().display()
            ))
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn render<T: Serialize>(value: &T, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            out
        }
        Format::Yaml => serde_yaml::to_string(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_defaults_to_warn() {
        assert_eq!(log_filter(None, false).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn verbose_raises_default_to_debug() {
        assert_eq!(log_filter(None, true).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn verbose_applies_on_top_of_env_directives() {
        let filter = log_filter(Some("error"), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn verbose_keeps_more_verbose_env_level() {
        let filter = log_filter(Some("trace"), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn env_directives_without_verbose_are_kept() {
        let filter = log_filter(Some("info"), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
