use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use orbital_transit::config;
use orbital_transit::ephemeris::Registry;
use orbital_transit::routes::{shortest_route, RouteGraph};
use orbital_transit::transfer::TransferPlanner;
use transit_cli::{format_epoch, parse_epoch};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cheapest multi-leg route between two locations")]
struct Cli {
    /// Scenario document (YAML or TOML).
    #[arg(long, default_value = "configs/solar_system.yaml")]
    config: PathBuf,
    /// Start location id.
    #[arg(long)]
    from: String,
    /// Destination location id.
    #[arg(long)]
    to: String,
    /// Departure: ISO date or seconds past J2000.
    #[arg(long)]
    depart: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let document = config::load_document(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let registry = Arc::new(Registry::from_config(&document)?);
    let graph = RouteGraph::build(&registry);
    let planner = TransferPlanner::new(registry);

    let departure_epoch_s = parse_epoch(&cli.depart)?;
    let legs = shortest_route(&planner, &graph, &cli.from, &cli.to, departure_epoch_s)
        .with_context(|| format!("routing {} -> {}", cli.from, cli.to))?;

    if legs.is_empty() {
        println!("{} and {} are the same location", cli.from, cli.to);
        return Ok(());
    }

    println!(
        "route {} -> {} departing {}:",
        cli.from,
        cli.to,
        format_epoch(departure_epoch_s)
    );
    let mut total_dv = 0.0;
    let mut total_tof = 0.0;
    for (index, leg) in legs.iter().enumerate() {
        total_dv += leg.solution.dv_total_m_s;
        total_tof += leg.solution.tof_s;
        println!(
            "  {}. {} -> {}: {:.0} m/s, {:.2} d",
            index + 1,
            leg.from,
            leg.to,
            leg.solution.dv_total_m_s,
            leg.solution.tof_s / 86_400.0,
        );
    }
    println!(
        "total: {:.0} m/s over {:.2} d across {} legs",
        total_dv,
        total_tof / 86_400.0,
        legs.len()
    );
    let stats = planner.cache_stats();
    log::debug!(
        "cache: {} hits / {} misses, {} entries",
        stats.hits,
        stats.misses,
        stats.entries
    );
    Ok(())
}
