//! navtint CLI
//!
//! Inspect overlay theming decisions without a browser.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use navtint_layout::{parse_color, PageFixture};
use navtint_theme::{classify_sample, OverlayConfig};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod simulate;

#[derive(Parser)]
#[command(name = "navtint")]
#[command(author, version, about = "Adaptive navigation overlay theming", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll a page fixture and print the overlay theme at each offset
    Simulate {
        /// Page fixture (TOML)
        #[arg(long)]
        page: PathBuf,

        /// Overlay configuration (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Active route
        #[arg(long, default_value = "/")]
        route: String,

        /// Comma-separated scroll offsets; the whole page when omitted
        #[arg(long, value_delimiter = ',')]
        offsets: Vec<f32>,

        /// Step between offsets when none are given
        #[arg(long, default_value_t = 100.0)]
        step: f32,

        /// Overlay height in pixels
        #[arg(long, default_value_t = 64.0)]
        overlay_height: f32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Classify a single CSS background color
    Classify {
        /// Color value, e.g. "rgb(29, 78, 216)" or "#0a0a0a"
        color: String,

        /// Overlay configuration providing thresholds
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate an overlay configuration and print its effective values
    CheckConfig {
        /// Configuration file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate {
            page,
            config,
            route,
            offsets,
            step,
            overlay_height,
            json,
        } => cmd_simulate(
            &page,
            config.as_deref(),
            &route,
            offsets,
            step,
            overlay_height,
            json,
        ),
        Commands::Classify { color, config } => cmd_classify(&color, config.as_deref()),
        Commands::CheckConfig { path } => cmd_check_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> Result<OverlayConfig> {
    match path {
        Some(path) => OverlayConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(OverlayConfig::default()),
    }
}

fn cmd_simulate(
    page: &Path,
    config: Option<&Path>,
    route: &str,
    offsets: Vec<f32>,
    step: f32,
    overlay_height: f32,
    json: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let tree = PageFixture::load(page)
        .and_then(|fixture| fixture.build())
        .with_context(|| format!("Failed to build page {}", page.display()))?;

    let offsets = if offsets.is_empty() {
        simulate::default_offsets(&tree, step)
    } else {
        offsets
    };
    tracing::info!(route, offsets = offsets.len(), "simulating");

    let rows = simulate::simulate(tree, &config, route, &offsets, overlay_height)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:>8}  {:<5}  decided by", "offset", "theme");
    for row in &rows {
        println!(
            "{:>8}  {:<5}  {}",
            row.offset,
            row.theme.id(),
            simulate::describe(&row.decided_by)
        );
    }
    Ok(())
}

fn cmd_classify(color: &str, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let sample = parse_color(color).with_context(|| format!("Invalid color {color:?}"))?;

    if sample.is_transparent() {
        println!("{sample}: transparent, the walk continues to the parent");
        return Ok(());
    }

    match classify_sample(sample, &config.thresholds) {
        Some(decision) => println!(
            "{sample}: {} ({})",
            decision.theme,
            simulate::describe(&decision.source)
        ),
        None => println!("{sample}: inconclusive, the walk continues to the parent"),
    }
    Ok(())
}

fn cmd_check_config(path: &Path) -> Result<()> {
    let config = OverlayConfig::load(path)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    print!("{}", config.to_toml()?);
    eprintln!(
        "{}: ok ({} regions, {} always-dark routes)",
        path.display(),
        config.regions.len(),
        config.always_dark_routes.len()
    );
    Ok(())
}
