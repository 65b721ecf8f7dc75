use boardgen::config::range_types::{AttemptBudget, UnitFraction};
use boardgen::config::{BoardConfig, load_config, load_from_path, save_config};
use boardgen::errors::BoardResult;
use boardgen::generation::{BoardGenerator, GenerationOutcome, StartCell};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

mod cli {
    pub mod cli_utils;
    pub mod preview;
}

use cli::cli_utils::*;
use cli::preview::{category_counts, render_ascii};

const DEFAULT_PRESET: &str = "open_field";

#[derive(Parser, Clone)]
#[command(name = "boardgen")]
#[command(about = "Generate rule-driven terrain boards with guaranteed connectivity")]
struct Args {
    /// Board size in cells (format: WIDTHxHEIGHT)
    #[arg(long)]
    size: Option<String>,

    /// Random seed for reproducible generation (0 picks one from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Built-in rule preset (open_field, rocky, river_lands, caverns)
    #[arg(long)]
    preset: Option<String>,

    /// Board config TOML with settings and/or rules, instead of the user config
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Minimum fraction of open cells (0.0-1.0)
    #[arg(long)]
    min_open: Option<f32>,

    /// Minimum fraction of open cells reachable from the start (0.0-1.0)
    #[arg(long)]
    min_reachable: Option<f32>,

    /// Attempts before keeping the best board
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Neighbor topology for reachability (four, eight)
    #[arg(long)]
    topology: Option<String>,

    /// Start cell for reachability (format: X,Y); defaults to the center
    #[arg(long)]
    start: Option<String>,

    /// Print an ASCII rendering of the board
    #[arg(long)]
    preview: bool,

    /// Log every rule and attempt
    #[arg(long)]
    verbose: bool,

    /// Store the effective settings as the user config
    #[arg(long)]
    save_config: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Layer command line overrides on top of a loaded config
fn apply_args(args: &Args, config: &mut BoardConfig) -> BoardResult<()> {
    let settings = &mut config.settings;
    if let Some(size) = &args.size {
        let (width, height) = parse_size(size)?;
        settings.width = width;
        settings.height = height;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(min_open) = args.min_open {
        settings.min_unblocked = UnitFraction::new(validate_fraction("min-open", min_open));
    }
    if let Some(min_reachable) = args.min_reachable {
        settings.min_reachable =
            UnitFraction::new(validate_fraction("min-reachable", min_reachable));
    }
    if let Some(max_attempts) = args.max_attempts {
        settings.max_attempts = AttemptBudget::new(max_attempts);
    }
    if let Some(topology) = &args.topology {
        settings.topology = parse_topology(topology)?;
    }
    if let Some(start) = &args.start {
        let (x, y) = parse_cell(start)?;
        settings.start = StartCell::At { x, y };
    }

    if let Some(preset) = &args.preset {
        config.preset = Some(preset.clone());
        config.rules.clear();
    } else if config.rules.is_empty() && config.preset.is_none() {
        config.preset = Some(DEFAULT_PRESET.to_string());
    }
    Ok(())
}

fn main() -> BoardResult<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.rules {
        Some(path) => load_from_path(path)?,
        None => load_config(),
    };
    apply_args(&args, &mut config)?;
    let rules = config.resolve_rules()?;

    let mut generator = BoardGenerator::new();
    let outcome = generator.generate(&rules, &config.settings)?;

    if args.save_config {
        let path = save_config(&config)?;
        println!("Config saved to: {}", path.display());
    }

    print_board_summary(&generator, &config, &outcome);
    if args.preview {
        println!("\n{}", render_ascii(generator.grid(), outcome.start));
    }
    Ok(())
}

fn print_board_summary(generator: &BoardGenerator, config: &BoardConfig, outcome: &GenerationOutcome) {
    let grid = generator.grid();
    let source = match &config.preset {
        Some(name) if config.rules.is_empty() => format!("preset '{name}'"),
        _ => format!("{} custom rules", config.rules.len()),
    };

    println!("Board summary:");
    println!("  Size: {}x{} ({} cells)", grid.width(), grid.height(), grid.cell_count());
    println!("  Rules: {source}");
    println!("  Seed: {} (kept attempt seed {})", outcome.seed, outcome.attempt_seed);
    println!(
        "  Attempts: {} ({})",
        outcome.attempts,
        if outcome.accepted {
            "accepted"
        } else {
            "thresholds not met, best attempt kept"
        }
    );
    println!(
        "  Open: {:.1}% (min {:.1}%)",
        outcome.open_fraction * 100.0,
        config.settings.min_unblocked.get() * 100.0
    );
    println!(
        "  Reachable: {:.1}% of open cells (min {:.1}%)",
        outcome.reachable_fraction * 100.0,
        config.settings.min_reachable.get() * 100.0
    );
    match outcome.start.map(|start| grid.index_to_coord(start)) {
        Some(Ok(coord)) => println!("  Start: {coord}"),
        _ => println!("  Start: none (no open cells)"),
    }
    println!("  Min terrain cost: {}", outcome.min_terrain_cost);
    println!(
        "  Painted {} cells, skipped {}",
        outcome.stats.painted,
        outcome.stats.skipped()
    );

    println!("  Categories:");
    for (category, (open, blocked)) in category_counts(grid) {
        println!("    {category}: {open} open, {blocked} blocked");
    }
}
