use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;

use transit_cli::format_epoch;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a porkchop heatmap from a grid CSV")]
struct Cli {
    /// Per-cell CSV written by the porkchop bin.
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = "artifacts/porkchop.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 1100)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Clip colours above this multiple of the grid minimum.
    #[arg(long, default_value_t = 3.0)]
    clip_factor: f64,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    departure_s: f64,
    tof_days: f64,
    dv_m_s: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let cells = read_cells(&cli.input)?;
    if cells.is_empty() {
        anyhow::bail!("no feasible cells in {}", cli.input.display());
    }

    let mut departures: Vec<f64> = cells.iter().map(|c| c.departure_s).collect();
    departures.sort_by(f64::total_cmp);
    departures.dedup();
    let mut tofs: Vec<f64> = cells.iter().map(|c| c.tof_days).collect();
    tofs.sort_by(f64::total_cmp);
    tofs.dedup();

    let dv_min = cells
        .iter()
        .map(|c| c.dv_m_s)
        .fold(f64::INFINITY, f64::min);
    let dv_clip = dv_min * cli.clip_factor;
    let best = cells
        .iter()
        .min_by(|a, b| a.dv_m_s.total_cmp(&b.dv_m_s))
        .copied()
        .context("no cells")?;

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output = cli
        .output
        .to_str()
        .context("output path contains invalid UTF-8")?;
    let root = BitMapBackend::new(output, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let dep_lo = *departures.first().context("empty axis")?;
    let dep_hi = *departures.last().context("empty axis")?;
    let dep_span_days = (dep_hi - dep_lo) / 86_400.0;
    let tof_lo = *tofs.first().context("empty axis")?;
    let tof_hi = *tofs.last().context("empty axis")?;

    let mut chart = ChartBuilder::on(&root)
        .margin(18)
        .caption("Transfer window scan", ("sans-serif", 24))
        .x_label_area_size(52)
        .y_label_area_size(64)
        .build_cartesian_2d(0.0..dep_span_days.max(1e-6), tof_lo..tof_hi)?;
    chart
        .configure_mesh()
        .x_desc("Departure")
        .y_desc("Time of flight (days)")
        .x_labels(6)
        .x_label_formatter(&|d| format_epoch(dep_lo + d * 86_400.0))
        .draw()?;

    let dep_step = step_of(&departures) / 86_400.0;
    let tof_step = step_of(&tofs);
    for cell in &cells {
        let x = (cell.departure_s - dep_lo) / 86_400.0;
        let t = if dv_clip > dv_min {
            ((cell.dv_m_s.min(dv_clip) - dv_min) / (dv_clip - dv_min)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (x - 0.5 * dep_step, cell.tof_days - 0.5 * tof_step),
                (x + 0.5 * dep_step, cell.tof_days + 0.5 * tof_step),
            ],
            heat_color(t).filled(),
        )))?;
    }

    // crosshair on the global minimum
    let bx = (best.departure_s - dep_lo) / 86_400.0;
    chart.draw_series(std::iter::once(Cross::new(
        (bx, best.tof_days),
        8,
        ShapeStyle::from(&BLACK).stroke_width(2),
    )))?;
    chart.draw_series(std::iter::once(Text::new(
        format!(
            "{:.2} km/s @ {}",
            best.dv_m_s / 1_000.0,
            format_epoch(best.departure_s)
        ),
        (bx + 0.01 * dep_span_days, best.tof_days),
        ("sans-serif", 16),
    )))?;

    root.present()?;
    log::info!("heatmap written to {}", cli.output.display());
    Ok(())
}

fn read_cells(path: &PathBuf) -> anyhow::Result<Vec<Cell>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("CSV missing `{name}` column"))
    };
    let dep_idx = col("departure_s")?;
    let tof_idx = col("tof_days")?;
    let dv_idx = col("dv_total_m_s")?;

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record?;
        let departure_s: f64 = record.get(dep_idx).unwrap_or("").parse().unwrap_or(f64::NAN);
        let tof_days: f64 = record.get(tof_idx).unwrap_or("").parse().unwrap_or(f64::NAN);
        let dv_m_s: f64 = record.get(dv_idx).unwrap_or("").parse().unwrap_or(f64::NAN);
        if departure_s.is_finite() && tof_days.is_finite() && dv_m_s.is_finite() {
            cells.push(Cell {
                departure_s,
                tof_days,
                dv_m_s,
            });
        }
    }
    Ok(cells)
}

/// Smallest spacing of a sorted axis; falls back to 1 for degenerate axes.
fn step_of(values: &[f64]) -> f64 {
    let step = values
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() && step > 0.0 {
        step
    } else {
        1.0
    }
}

/// Blue (cheap) through green to red (clipped).
fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let ramp = |v: f64| (1.0 - (v - 1.0).abs()).clamp(0.0, 1.0);
    RGBColor(
        (ramp(1.5 - 4.0 * (t - 0.75).abs()) * 255.0) as u8,
        (ramp(1.5 - 4.0 * (t - 0.5).abs()) * 255.0) as u8,
        (ramp(1.5 - 4.0 * (t - 0.25).abs()) * 255.0) as u8,
    )
}
