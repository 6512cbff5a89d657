//! isodecl CLI - per-module TypeScript declaration emitter.

use anyhow::{bail, Context, Result};
use clap::Parser;
use isodecl_cli::config::{IsodeclConfig, CONFIG_FILE};
use isodecl_cli::formatters::{Formatter, HumanFormatter, JsonFormatter};
use isodecl_cli::run_build;
use isodecl_core::EntryInput;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "isodecl")]
#[command(about = "Emit one .d.ts file per TypeScript module with working import paths", long_about = None)]
struct Cli {
    /// Entry modules (paths or glob patterns)
    ///
    /// Examples:
    ///   isodecl src/index.ts --out-dir dist
    ///   isodecl 'src/*.ts' --out-dir dist
    ///   isodecl --entry index=src/main.ts --entry cli=src/cli.ts --out-dir dist
    #[arg(value_name = "ENTRIES")]
    entries: Vec<String>,

    /// Aliased entry as NAME=PATH (can be specified multiple times)
    #[arg(long = "entry", value_name = "NAME=PATH", conflicts_with = "entries")]
    aliased: Vec<String>,

    /// Configuration file path (defaults to ./isodecl.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory declarations are written to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Output name template, e.g. "[name].js" or "[name]/index.js"
    #[arg(long)]
    template: Option<String>,

    /// Base directory for unaliased names
    #[arg(long)]
    base_dir: Option<String>,

    /// Directory joined in front of the template
    #[arg(long)]
    extra_outdir: Option<String>,

    /// Declaration extension for JavaScript sources (ts, mts, cts)
    #[arg(long)]
    out_ext: Option<String>,

    /// Append runtime extensions to relative specifiers
    #[arg(long)]
    auto_add_exts: bool,

    /// Emit declaration source maps
    #[arg(long)]
    source_map: bool,

    /// Downgrade transform errors to warnings
    #[arg(long)]
    ignore_errors: bool,

    /// Turn `export default X` into `export = X` in .d.cts output
    #[arg(long)]
    patch_cjs: bool,

    /// Drop declarations tagged @internal
    #[arg(long)]
    strip_internal: bool,

    /// Print declarations instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "isodecl_core=debug,isodecl_oxc=debug,isodecl_cli=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_aliased(aliased: &[String]) -> Result<BTreeMap<String, String>> {
    aliased
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => {
                Ok((name.to_string(), path.to_string()))
            }
            _ => bail!("Invalid --entry {pair:?}, expected NAME=PATH"),
        })
        .collect()
}

/// Apply command-line flags over the loaded configuration.
fn apply_flags(mut config: IsodeclConfig, cli: Cli) -> Result<IsodeclConfig> {
    if !cli.aliased.is_empty() {
        config.entries = EntryInput::Map(parse_aliased(&cli.aliased)?);
    } else if !cli.entries.is_empty() {
        config.entries = EntryInput::List(cli.entries);
    }

    if let Some(out_dir) = cli.out_dir {
        config.out_dir = Some(out_dir);
    }
    if let Some(template) = cli.template {
        config.template = template;
    }
    if let Some(base_dir) = cli.base_dir {
        config.base_dir = Some(base_dir);
    }
    if let Some(extra_outdir) = cli.extra_outdir {
        config.extra_outdir = Some(extra_outdir);
    }
    if let Some(out_ext) = cli.out_ext {
        config.out_ext = out_ext;
    }

    config.auto_add_exts |= cli.auto_add_exts;
    config.source_map |= cli.source_map;
    config.ignore_errors |= cli.ignore_errors;
    config.patch_cjs_default_export |= cli.patch_cjs;
    config.strip_internal |= cli.strip_internal;
    if cli.dry_run {
        config.write = false;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let config = match &cli.config {
            Some(path) => IsodeclConfig::load_from(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => IsodeclConfig::discover(&cwd)
                .await
                .with_context(|| format!("Failed to load {CONFIG_FILE}"))?,
        };

        let json = cli.json;
        let config = apply_flags(config, cli)?;
        let report = run_build(&config, &cwd).await?;

        if json {
            JsonFormatter.format(&report);
        } else {
            HumanFormatter { cwd: cwd.clone() }.format(&report);
        }
        Ok(())
    })
}
