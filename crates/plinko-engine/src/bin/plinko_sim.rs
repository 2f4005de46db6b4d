//! Headless batch runner.
//!
//! Drops chips in both modes on one board and reports where they landed,
//! next to the binomial distribution, plus the deterministic-mode hit rate.
//!
//! ```text
//! plinko-sim [--rows N] [--drops N] [--seed N] [--target SLOT] [--config FILE] [--json]
//! ```
//!
//! Logging goes through `RUST_LOG` (default `info`).

use std::collections::HashMap;

use anyhow::{bail, Context};
use plinko_engine::prelude::*;
use serde::Serialize;

/// Steps between consecutive drops, so chips do not spawn on top of each other.
const DROP_SPACING: u64 = 10;

/// Upper bound on the drain after the last drop (simulated minutes at 60 Hz).
const DRAIN_STEPS: u64 = 60 * 60 * 5;

#[derive(Debug)]
struct Args {
    rows: Option<u32>,
    drops: usize,
    seed: Option<u64>,
    target: Option<usize>,
    config: Option<String>,
    json: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        rows: None,
        drops: 500,
        seed: None,
        target: None,
        config: None,
        json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().with_context(|| format!("{flag} needs a value"));
        match flag.as_str() {
            "--rows" => args.rows = Some(value()?.parse().context("--rows")?),
            "--drops" => args.drops = value()?.parse().context("--drops")?,
            "--seed" => args.seed = Some(value()?.parse().context("--seed")?),
            "--target" => args.target = Some(value()?.parse().context("--target")?),
            "--config" => args.config = Some(value()?),
            "--json" => args.json = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

#[derive(Debug, Serialize)]
struct ModeReport {
    mode: DropMode,
    drops: usize,
    landed: usize,
    counts: Vec<usize>,
    /// Share of steered chips that landed on their target.
    hit_rate: Option<f64>,
    stats: EngineStats,
}

#[derive(Debug, Serialize)]
struct Report {
    rows: u32,
    expected: Vec<f64>,
    modes: Vec<ModeReport>,
}

fn run_mode(config: &EngineConfig, mode: DropMode, args: &Args) -> anyhow::Result<ModeReport> {
    let mut engine = Engine::new(config.clone())?;
    let request = match (mode, args.target) {
        (DropMode::Physics, _) => DropRequest::physics(),
        (DropMode::Deterministic, Some(slot)) => DropRequest::targeting(slot),
        (DropMode::Deterministic, None) => DropRequest::deterministic(),
    };

    let mut targets: HashMap<ChipId, Option<usize>> = HashMap::new();
    let mut events = Vec::new();
    for _ in 0..args.drops {
        let id = engine.drop_chip(request)?;
        targets.insert(id, engine.chip(id).and_then(|c| c.target_slot));
        for _ in 0..DROP_SPACING {
            events.extend(engine.step());
        }
    }
    events.extend(engine.run_until_idle(DRAIN_STEPS));

    let mut counts = vec![0usize; engine.slots().len()];
    let (mut landed, mut hits) = (0usize, 0usize);
    for event in &events {
        if let EngineEvent::SlotLanded { chip, slot } = *event {
            counts[slot] += 1;
            landed += 1;
            if targets.get(&chip).copied().flatten() == Some(slot) {
                hits += 1;
            }
        }
    }
    if engine.active_chip_count() > 0 {
        tracing::warn!(stranded = engine.active_chip_count(), "chips still in flight after drain");
    }

    let hit_rate = (mode == DropMode::Deterministic && landed > 0).then(|| hits as f64 / landed as f64);
    Ok(ModeReport {
        mode,
        drops: args.drops,
        landed,
        counts,
        hit_rate,
        stats: engine.stats(),
    })
}

fn print_table(report: &Report) {
    println!("rows {}", report.rows);
    println!("{:>4}  {:>8}  {:>8}  {:>8}", "slot", "expected", "physics", "steered");
    for (slot, p) in report.expected.iter().enumerate() {
        let share = |m: &ModeReport| m.counts[slot] as f64 / m.landed.max(1) as f64;
        let cols: Vec<String> = report.modes.iter().map(|m| format!("{:>8.4}", share(m))).collect();
        println!("{slot:>4}  {p:>8.4}  {}", cols.join("  "));
    }
    for m in &report.modes {
        print!("{:?}: {}/{} landed", m.mode, m.landed, m.drops);
        if let Some(rate) = m.hit_rate {
            print!(", hit rate {:.1}%", rate * 100.0);
        }
        println!(
            ", {} peg hits, {} recoveries, {} steered chip-steps",
            m.stats.peg_hits, m.stats.recoveries, m.stats.steering_corrections
        );
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            EngineConfig::from_json(&text)?
        }
        None => EngineConfig::default(),
    };
    if let Some(rows) = args.rows {
        config.board.rows = RowCount::new(rows)?;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let rows = config.board.rows;
    let modes = [DropMode::Physics, DropMode::Deterministic]
        .into_iter()
        .map(|mode| run_mode(&config, mode, &args))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let report = Report {
        rows: rows.get(),
        expected: distribution(rows).to_vec(),
        modes,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }
    Ok(())
}
