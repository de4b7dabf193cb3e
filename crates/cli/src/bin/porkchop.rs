use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use orbital_transit::config;
use orbital_transit::ephemeris::Registry;
use orbital_transit::export::porkchop as export;
use orbital_transit::transfer::{PorkchopControl, PorkchopRequest, TransferPlanner};
use transit_cli::{format_epoch, parse_epoch};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scan a departure x time-of-flight grid between two bodies")]
struct Cli {
    /// Scenario document (YAML or TOML).
    #[arg(long, default_value = "configs/solar_system.yaml")]
    config: PathBuf,
    /// Departure body id.
    #[arg(long)]
    from: String,
    /// Arrival body id.
    #[arg(long)]
    to: String,
    /// First departure: ISO date or seconds past J2000.
    #[arg(long)]
    depart: String,
    /// Width of the departure window in days.
    #[arg(long, default_value_t = 360.0)]
    span_days: f64,
    /// Shortest flight time in days.
    #[arg(long, default_value_t = 90.0)]
    tof_min_days: f64,
    /// Longest flight time in days.
    #[arg(long, default_value_t = 400.0)]
    tof_max_days: f64,
    /// Grid edge length (cells per axis).
    #[arg(long, default_value_t = 40)]
    grid: usize,
    /// Highest revolution count offered to the Lambert solver.
    #[arg(long, default_value_t = 2)]
    max_revs: u32,
    /// Per-cell CSV output path (`-` for stdout).
    #[arg(long, default_value = "artifacts/porkchop_grid.csv")]
    grid_csv: PathBuf,
    /// Ranked best-cells CSV output path.
    #[arg(long, default_value = "artifacts/porkchop_top.csv")]
    top_csv: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let document = config::load_document(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let registry = Arc::new(Registry::from_config(&document)?);
    let planner = TransferPlanner::new(registry);

    let departure_start_s = parse_epoch(&cli.depart)?;
    let request = PorkchopRequest {
        from_body: cli.from.clone(),
        to_body: cli.to.clone(),
        departure_start_s,
        departure_end_s: departure_start_s + cli.span_days * 86_400.0,
        tof_min_days: cli.tof_min_days,
        tof_max_days: cli.tof_max_days,
        grid_size: cli.grid,
        max_revs: cli.max_revs,
    };
    let result = planner
        .compute_porkchop(&request, &PorkchopControl::default())
        .with_context(|| format!("scanning {} -> {}", cli.from, cli.to))?;

    let mut grid_writer = export::writer_for_path(&cli.grid_csv)?;
    export::write_grid(grid_writer.as_mut(), &result)?;
    grid_writer.flush()?;
    let mut top_writer = export::writer_for_path(&cli.top_csv)?;
    export::write_top(top_writer.as_mut(), &result.top)?;
    top_writer.flush()?;

    if let Some(best) = result.top.first() {
        println!(
            "best window: depart {} ({:.0} s), {:.1} d flight, {:.0} m/s total ({:.0} out / {:.0} in)",
            format_epoch(best.departure_epoch_s),
            best.departure_epoch_s,
            best.tof_s / 86_400.0,
            best.dv_total_m_s,
            best.dv_depart_m_s,
            best.dv_arrive_m_s,
        );
    }
    log::info!(
        "grid written to {}, top cells to {}",
        cli.grid_csv.display(),
        cli.top_csv.display()
    );
    Ok(())
}
