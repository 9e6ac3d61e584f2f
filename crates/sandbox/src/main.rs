//! Chronicles of Aethermoor - Engine Sandbox
//!
//! Drives the coordination engine through a demo run: a splash screen
//! that hands over to gameplay, a recurring autosave, periodic pauses,
//! weather and calendar progression, all recorded to JSONL.

use std::cell::RefCell;
use std::fs;
use std::process;
use std::rc::Rc;

use clap::Parser;
use serde_json::Map;
use tracing_subscriber::EnvFilter;

use aether_core::{Engine, EngineConfig, EventRecorder, OwnerHandle};
use aether_events::EventKind;

mod states;

use states::SplashState;

/// Command line arguments for the sandbox
#[derive(Parser, Debug)]
#[command(name = "sandbox")]
#[command(about = "Demo driver for the Aethermoor coordination engine")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Real seconds per tick
    #[arg(long, default_value_t = 0.1)]
    delta: f64,

    /// Game minutes per real second (overrides the config file)
    #[arg(long)]
    time_scale: Option<f64>,

    /// Configuration file path
    #[arg(long, default_value = "engine.toml")]
    config: String,

    /// Where to write the final snapshot
    #[arg(long, default_value = "output/final_snapshot.json")]
    snapshot_path: String,

    /// Where to write the JSONL event record
    #[arg(long, default_value = "output/events.jsonl")]
    events_path: String,
}

fn main() {
    let args = Args::parse();

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    println!("Chronicles of Aethermoor - Engine Sandbox");
    println!("=========================================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!("Delta: {}s per tick", args.delta);
    println!("Config: {}", args.config);
    println!();

    let mut config = EngineConfig::load_or_default(&args.config);
    if let Some(scale) = args.time_scale {
        config.time.time_scale = scale;
    }

    let mut engine = match Engine::new(config, args.seed) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    fs::create_dir_all("output").unwrap_or_else(|e| {
        eprintln!("Warning: Could not create output directory: {}", e);
    });

    // Record every published event to JSONL. The owner handle must
    // outlive the run or the subscriptions go dead.
    let recorder = match EventRecorder::new(&args.events_path) {
        Ok(recorder) => Rc::new(RefCell::new(recorder)),
        Err(e) => {
            eprintln!(
                "Warning: Could not open {}: {}. Events will not be recorded.",
                args.events_path, e
            );
            Rc::new(RefCell::new(EventRecorder::null()))
        }
    };
    let recorder_owner = OwnerHandle::new();
    for &kind in EventKind::all() {
        let sink = recorder.clone();
        engine.bus().subscribe(kind, &recorder_owner, move |event| {
            if let Err(e) = sink.borrow_mut().record(event) {
                tracing::warn!("failed to record event: {}", e);
            }
        });
    }

    // Demo content: splash bootstraps the state machine, the scheduler
    // drives a recurring autosave
    engine.push_state(Box::new(SplashState::new()));
    if let Err(e) =
        engine
            .time_mut()
            .schedule_recurring("autosave", 60, 60, EventKind::SaveRequested, Map::new())
    {
        eprintln!("Warning: Could not schedule autosave: {}", e);
    }

    println!("Starting run...");
    println!();

    let mut completed = 0;
    for tick in 0..args.ticks {
        engine.tick(args.delta);
        completed = tick + 1;

        if completed % 50 == 0 {
            let time = engine.time();
            println!(
                "[Tick {:>4}] {} | {} | {} | light {:.2} | {} state(s)",
                completed,
                time.time(),
                time.day_period(),
                time.weather(),
                time.light_level(),
                engine.stack().len()
            );
        }

        if engine.should_quit() {
            println!("Quit requested at tick {}.", completed);
            break;
        }
    }

    let snapshot = engine.snapshot(25);
    match snapshot.to_json_pretty() {
        Ok(json) => {
            if let Err(e) = fs::write(&args.snapshot_path, json) {
                eprintln!("Warning: Could not write final snapshot: {}", e);
            } else {
                println!();
                println!("Wrote {}", args.snapshot_path);
            }
        }
        Err(e) => eprintln!("Warning: Could not serialize snapshot: {}", e),
    }

    engine.shutdown();
    if let Err(e) = recorder.borrow_mut().flush() {
        eprintln!("Warning: Could not flush event record: {}", e);
    }

    println!();
    println!(
        "Run complete. {} ticks, ending {} with {} ({} events recorded).",
        completed,
        engine.time().time(),
        engine.time().weather(),
        recorder.borrow().recorded()
    );
}
