use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seesaw_balance::config::{load_or_default, SystemConfig, DEFAULT_CONFIG_PATH};
use seesaw_balance::disturbance::{DisturbanceGenerator, SetpointProfile};
use seesaw_balance::session::{self, ControlMode, InputEvent};
use seesaw_balance::visualization::dashboard::render_report_charts;
use seesaw_balance::{log, ControlLoopRunner, TimingMetrics};

#[derive(Parser, Debug)]
#[command(name = "seesaw-balance")]
#[command(about = "Ball-on-seesaw simulation with PID control and gain sweeps")]
struct Cli {
    /// TOML config; defaults are used when the file does not exist
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the PID loop over the +5/-5 step profile and score it
    Run {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        charts: Option<PathBuf>,
        /// Seed for a noisy external force; no disturbance when omitted
        #[arg(long)]
        disturbance_seed: Option<u64>,
        #[arg(long, default_value_t = 0.5)]
        noise: f64,
    },
    /// Evaluate every gain triple of the configured grid
    Sweep {
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long)]
        charts: Option<PathBuf>,
    },
    /// Drive a headless keyboard or PID session with scripted inputs
    Session {
        #[arg(long, default_value = "pid")]
        mode: String,
        #[arg(long, default_value_t = 600)]
        ticks: usize,
        /// `tick:event`, e.g. `0:7` or `120:force+`
        #[arg(long = "input")]
        inputs: Vec<String>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_or_default(&cli.config)
        .with_context(|| format!("failed loading {}", cli.config.display()))?;

    match cli.command {
        Command::Run {
            csv,
            charts,
            disturbance_seed,
            noise,
        } => run(&config, csv, charts, disturbance_seed, noise),
        Command::Sweep {
            workers,
            top,
            json,
            charts,
        } => sweep(&config, workers, top, json, charts),
        Command::Session {
            mode,
            ticks,
            inputs,
            csv,
        } => run_session(&config, &mode, ticks, &inputs, csv),
    }
}

fn ticks_per_second(config: &SystemConfig) -> usize {
    (1.0 / config.delta_t).round().max(1.0) as usize
}

fn run(
    config: &SystemConfig,
    csv: Option<PathBuf>,
    charts: Option<PathBuf>,
    disturbance_seed: Option<u64>,
    noise: f64,
) -> Result<()> {
    println!("===========================================");
    println!("Seesaw PID Run");
    println!("===========================================\n");

    let setpoints = SetpointProfile::default_steps(ticks_per_second(config));
    let forces = disturbance_seed
        .map(|seed| {
            DisturbanceGenerator::new(seed)
                .with_noise(0.0, noise)
                .map(|mut gen| gen.sequence(setpoints.len()))
        })
        .transpose()
        .context("invalid --noise")?;

    let mut controller = config.build_controller_for(config.gains(), setpoints[0]);
    let mut simulation = config.build_simulation()?;
    let trajectory = ControlLoopRunner::new(&mut controller, &mut simulation)
        .derivative_mode(config.derivative_mode)
        .run(&setpoints, forces.as_deref())?;
    let fitness = trajectory.fitness(config.weight_factor)?;

    println!("Gains: kp={} ki={} kd={}", config.kp, config.ki, config.kd);
    println!("Ticks: {}", trajectory.len());
    if let Some(last) = trajectory.last() {
        println!(
            "Final: position {:.3} m, angle {:.2}°, velocity {:.3} m/s",
            last.position, last.angle, last.velocity
        );
    }
    println!("Fitness (weight {}): {:.4}", config.weight_factor, fitness);

    if let Some(path) = csv {
        log::write_trajectory_csv(&path, &trajectory)
            .with_context(|| format!("failed writing {}", path.display()))?;
        println!("Trajectory written to {}", path.display());
    }
    if let Some(dir) = charts {
        render_report_charts(&dir, Some(&trajectory), None);
    }
    Ok(())
}

fn sweep(
    config: &SystemConfig,
    workers: Option<usize>,
    top: usize,
    json: Option<PathBuf>,
    charts: Option<PathBuf>,
) -> Result<()> {
    println!("===========================================");
    println!("Brute-Force Gain Sweep");
    println!("===========================================\n");

    let mut spec = config.sweep_spec();
    if let Some(w) = workers {
        spec.workers = w;
    }
    let setpoints = SetpointProfile::default_steps(ticks_per_second(config));
    let metrics = TimingMetrics::new()?;
    let report = seesaw_balance::run_sweep(config, &spec, &setpoints, None, &metrics)?;

    println!(
        "Evaluated {} candidates on {} workers",
        report.candidates, report.workers
    );
    println!("\n=== Top {} ===", top.min(report.results.len()));
    for (rank, result) in report.top(top).iter().enumerate() {
        println!(
            "#{:<3} kp={:>8.3} ki={:>8.3} kd={:>8.3}  fitness={:.4}",
            rank + 1,
            result.gains.kp,
            result.gains.ki,
            result.gains.kd,
            result.fitness
        );
    }

    let m = &report.metrics;
    println!("\n=== Performance Metrics ===");
    println!("Evaluation P50: {:?}, P99: {:?}", m.evaluation_p50, m.evaluation_p99);
    println!("Tick P50: {:?}, P99: {:?}", m.tick_p50, m.tick_p99);
    println!("Queue wait P50: {:?}, P99: {:?}", m.queue_wait_p50, m.queue_wait_p99);

    if let Some(path) = json {
        let body = serde_json::to_string_pretty(&report).context("failed serializing report")?;
        std::fs::write(&path, body).with_context(|| format!("failed writing {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    if let Some(dir) = charts {
        render_report_charts(&dir, None, Some(&report.metrics));
    }
    Ok(())
}

fn parse_script(inputs: &[String]) -> Result<Vec<(usize, InputEvent)>> {
    inputs
        .iter()
        .map(|raw| {
            let (tick, event) = raw
                .split_once(':')
                .ok_or_else(|| anyhow!("input '{raw}' must look like tick:event"))?;
            let tick = tick
                .trim()
                .parse::<usize>()
                .with_context(|| format!("bad tick in input '{raw}'"))?;
            Ok((tick, event.parse::<InputEvent>()?))
        })
        .collect()
}

fn run_session(
    config: &SystemConfig,
    mode: &str,
    ticks: usize,
    inputs: &[String],
    csv: Option<PathBuf>,
) -> Result<()> {
    let mode: ControlMode = mode.parse()?;
    let script = parse_script(inputs)?;
    let mut active = session::create_session(mode, config)?;

    println!("===========================================");
    println!("{} Session ({} ticks)", mode, ticks);
    println!("===========================================\n");

    let trajectory = session::replay(active.as_mut(), &script, ticks).clone();
    println!("{}", active.render());

    if let Some(path) = csv {
        log::write_trajectory_csv(&path, &trajectory)
            .with_context(|| format!("failed writing {}", path.display()))?;
        println!("Trajectory written to {}", path.display());
    }
    Ok(())
}
