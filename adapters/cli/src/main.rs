#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Bulwark simulation.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use bulwark_core::{Command, Difficulty, Event};
use bulwark_world::{self as world, load_from_str, query, save_to_string, World, WorldConfig};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Runs a Bulwark world for a fixed number of ticks.
#[derive(Debug, Parser)]
#[command(name = "bulwark", version, about)]
struct Args {
    /// Difficulty tier used when generating a new world.
    #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
    difficulty: DifficultyArg,
    /// Seed for layout generation and the simulation RNG.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Tick length in seconds.
    #[arg(long, default_value_t = 0.1)]
    dt: f32,
    /// TOML file overriding the default world parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Save file to resume instead of generating a world.
    #[arg(long)]
    load: Option<PathBuf>,
    /// Where to write a save once the run ends.
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Entry point for the Bulwark command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let dt = tick_length(args.dt)?;

    let config = load_config(args.config.as_ref())?;
    let mut world = match &args.load {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read save {}", path.display()))?;
            load_from_str(&source, config)
                .with_context(|| format!("failed to load save {}", path.display()))?
        }
        None => World::new(config, args.difficulty.into(), args.seed)
            .context("failed to generate world")?,
    };

    let summary = run(&mut world, args.ticks, dt);
    let counts = query::counts(&world);
    info!(
        ticks = summary.ticks,
        moment = query::moment(&world),
        gold = query::gold(&world),
        lives = query::portal_lives(&world),
        waves = summary.waves,
        kills = summary.kills,
        breaches = summary.breaches,
        mobs = counts.mobs,
        projectiles = counts.projectiles,
        "run finished"
    );

    if let Some(path) = &args.save {
        fs::write(path, save_to_string(&world))
            .with_context(|| format!("failed to write save {}", path.display()))?;
        info!(path = %path.display(), "save written");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn tick_length(seconds: f32) -> Result<Duration> {
    ensure!(seconds > 0.0, "tick length must be positive, got {seconds}");
    Duration::try_from_secs_f32(seconds)
        .with_context(|| format!("invalid tick length {seconds}"))
}

fn load_config(path: Option<&PathBuf>) -> Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    WorldConfig::from_toml_str(&source)
        .with_context(|| format!("invalid config {}", path.display()))
}

#[derive(Debug, Default)]
struct RunSummary {
    ticks: u32,
    waves: u32,
    kills: u32,
    breaches: u32,
}

/// Ticks the world until `ticks` have run or every portal is depleted.
fn run(world: &mut World, ticks: u32, dt: Duration) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut events = Vec::new();

    for _ in 0..ticks {
        events.clear();
        world::apply(world, Command::Tick { dt }, &mut events);
        summary.ticks += 1;

        let mut depleted = false;
        for event in &events {
            match event {
                Event::WaveSpawned { .. } => summary.waves += 1,
                Event::MobKilled { .. } => summary.kills += 1,
                Event::MobBreached { .. } => summary.breaches += 1,
                Event::PortalDepleted { .. } => depleted = true,
                _ => {}
            }
            debug!(?event, "world event");
        }

        if depleted && query::portal_lives(world) == 0 {
            info!(moment = query::moment(world), "every portal depleted, stopping");
            break;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_definitions_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn arguments_parse_into_a_run() {
        let args = Args::try_parse_from([
            "bulwark",
            "--difficulty",
            "hard",
            "--seed",
            "9",
            "--ticks",
            "25",
        ])
        .expect("valid arguments");
        assert!(matches!(args.difficulty, DifficultyArg::Hard));
        assert_eq!(args.seed, 9);
        assert_eq!(args.ticks, 25);
        assert!(args.load.is_none());
    }

    #[test]
    fn tick_length_rejects_unusable_values() {
        assert_eq!(
            tick_length(0.25).expect("valid tick"),
            Duration::from_millis(250)
        );
        assert!(tick_length(0.0).is_err());
        assert!(tick_length(-1.0).is_err());
        assert!(tick_length(f32::NAN).is_err());
        assert!(tick_length(f32::INFINITY).is_err());
        assert!(tick_length(1.0e30).is_err());
    }

    #[test]
    fn run_counts_every_tick_and_wave() {
        let config = WorldConfig {
            spawner_reserve: 0.95,
            ..WorldConfig::default()
        };
        let mut world = World::new(config, Difficulty::Easy, 4).expect("generated world");
        let summary = run(&mut world, 10, Duration::from_millis(100));
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.waves, 1);
    }
}
