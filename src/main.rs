//! Foilride headless runner
//!
//! Drives a session with the autopilot and prints telemetry. Useful for
//! soak-testing tuning changes without a renderer attached.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::Vec2;

use foilride::consts::FRAME_DT;
use foilride::sim::{Autopilot, GridSpec, Session, Telemetry};
use foilride::{SimConfig, SwellPreset};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "foilride")]
#[command(about = "Headless hydrofoil ride simulation", long_about = None)]
struct Args {
    /// Simulated duration (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "30")]
    seconds: f32,

    /// Timestep per tick (seconds)
    #[arg(long, value_name = "SECONDS", default_value_t = FRAME_DT)]
    dt: f32,

    /// Autopilot seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Swell preset: mellow, classic (default), heavy
    #[arg(long, value_name = "PRESET", default_value = "classic")]
    preset: String,

    /// JSON config file (overrides --preset)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective config as JSON and exit
    #[arg(long, value_name = "PATH")]
    dump_config: Option<PathBuf>,

    /// Print telemetry every N ticks
    #[arg(long, value_name = "TICKS", default_value = "60")]
    report_every: u64,

    /// Print telemetry as JSON lines
    #[arg(long)]
    json: bool,

    /// Respawn after a crash instead of stopping
    #[arg(long)]
    respawn: bool,

    /// Evaluate an N x N display grid around the rider at the end
    #[arg(long, value_name = "N")]
    grid: Option<usize>,
}

impl Args {
    fn load_config(&self) -> Result<SimConfig> {
        if let Some(path) = &self.config {
            return SimConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()));
        }
        match SwellPreset::from_str(&self.preset) {
            Some(preset) => {
                log::info!("Swell preset: {}", preset.as_str());
                Ok(SimConfig::from_preset(preset))
            }
            None => bail!("unknown swell preset '{}'", self.preset),
        }
    }
}

fn report(telemetry: &Telemetry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(telemetry)?);
    } else {
        println!(
            "t={:6.2}s pos=({:7.1}, {:5.2}, {:7.1}) speed={:5.2} height={:5.2} pitch={:+.2} roll={:+.2} yaw={:+.2}",
            telemetry.time,
            telemetry.position[0],
            telemetry.position[1],
            telemetry.position[2],
            telemetry.speed,
            telemetry.height,
            telemetry.pitch,
            telemetry.roll,
            telemetry.yaw,
        );
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;

    if let Some(path) = &args.dump_config {
        config
            .save(path)
            .with_context(|| format!("writing config {}", path.display()))?;
        return Ok(());
    }

    let mut session = Session::start(&config).context("invalid configuration")?;
    let mut pilot = Autopilot::new(args.seed);
    let tuning = *session.dynamics().tuning();
    let total_ticks = (args.seconds / args.dt.max(1e-4)).ceil() as u64;
    let report_every = args.report_every.max(1);
    let mut crashes = 0u32;

    for tick in 1..=total_ticks {
        let input = pilot.next_input(session.state(), &tuning);
        let telemetry = session.tick(&input, args.dt);

        if tick % report_every == 0 || telemetry.verdict.is_crash() {
            report(&telemetry, args.json)?;
        }
        if let Some(reason) = &telemetry.reason {
            crashes += 1;
            if !args.json {
                println!("CRASH: {reason}");
            }
            if !args.respawn {
                break;
            }
            session.respawn();
        }
    }

    if let Some(size) = args.grid {
        let state = session.state();
        let grid = GridSpec::centered(Vec2::new(state.position.x, state.position.y), size, 1.0);
        let vertices = session.field().evaluate_grid(&grid, state.time);
        let (low, high) = vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[1]), hi.max(v.position[1]))
        });
        log::info!(
            "Display grid: {} vertices, surface height [{:.2}, {:.2}] m",
            vertices.len(),
            low,
            high
        );
    }

    log::info!("Run finished: {crashes} crash(es)");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Foilride (headless) starting...");
    run()
}
