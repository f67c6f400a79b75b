//! Command line report for one RPG Maker project.
//!
//! Usage:
//!   conflict-finder --project <dir>                 # conflicts and load order
//!   conflict-finder --project <dir> --json          # the same as JSON
//!   conflict-finder --project <dir> --show-ignored  # include ignored conflicts

use std::path::PathBuf;
use std::process;

use clap::Parser;
use conflict_finder::analysis::conflict::Conflict;
use conflict_finder::analysis::Analysis;
use conflict_finder::config::AnalysisConfig;
use conflict_finder::error::Result;
use conflict_finder::project::{analyze_project, DiskReader};
use conflict_finder::source::Origin;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// conflict-finder: method patch conflicts between RPG Maker MV/MZ plugins
#[derive(Parser, Debug)]
#[command(name = "conflict-finder")]
#[command(about = "Report plugin conflicts and suggest a load order", long_about = None)]
struct Cli {
    /// Project directory (the one holding `js/plugins.js`)
    #[arg(long)]
    project: PathBuf,

    /// Print the full report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Only list conflicts where both edits come from plugins
    #[arg(long, default_value_t = false)]
    plugins_only: bool,

    /// Also list conflicts that are ignored by default
    #[arg(long, default_value_t = false)]
    show_ignored: bool,

    /// JSON file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    let analysis = analyze_project(&cli.project, &DiskReader, &config)?;
    if cli.json {
        println!("{}", analysis.to_json()?);
    } else {
        print_report(cli, &analysis);
    }
    Ok(())
}

fn print_report(cli: &Cli, analysis: &Analysis) {
    let listed: Vec<(usize, &Conflict)> = analysis
        .conflicts()
        .iter()
        .enumerate()
        .filter(|(index, _)| cli.show_ignored || !analysis.is_ignored(*index))
        .filter(|(_, conflict)| !cli.plugins_only || is_between_plugins(conflict))
        .collect();

    println!("Conflicts ({}):", listed.len());
    for (index, conflict) in listed {
        println!(
            "  {}  {}: {} \u{2192} {}  ({}:{} \u{2192} {}:{}){}",
            conflict.name(),
            conflict.kind.letter(),
            conflict.earlier.style.letter(),
            conflict.later.style.letter(),
            conflict.earlier.file,
            conflict.earlier.span.start.line,
            conflict.later.file,
            conflict.later.span.start.line,
            if analysis.is_ignored(index) { "  [ignored]" } else { "" }
        );
    }

    let order = analysis.suggest_order();
    println!();
    println!("Suggested order:");
    let groups: Vec<String> = order.groups.iter().map(|group| group.join(", ")).collect();
    println!("  {}", groups.join(" \u{2192} "));
    if !order.cycles.is_empty() {
        println!();
        println!("Unsatisfiable ordering among: {}", order.cycles.join(", "));
    }
}

fn is_between_plugins(conflict: &Conflict) -> bool {
    conflict.earlier.origin == Origin::Plugin && conflict.later.origin == Origin::Plugin
}
