//! Headless fleet simulation runner
//!
//! Smoke-test and demo harness: builds the engine, drives it either by
//! stepping a fixed number of ticks (deterministic) or against the wall
//! clock for a while, then prints snapshots and analytics as JSON.

use std::path::Path;
use std::process;
use std::time::Duration;

use fleet_simulator_core_rs::{FleetService, RouteCatalog, SimulationConfig};

struct Args {
    topology: Option<String>,
    seed: u64,
    ticks: u64,
    tick_interval_secs: f64,
    realtime_secs: Option<f64>,
    events: usize,
}

impl Args {
    fn parse() -> Result<Args, String> {
        let mut args = Args {
            topology: None,
            seed: 42,
            ticks: 60,
            tick_interval_secs: 1.0,
            realtime_secs: None,
            events: 10,
        };

        let mut iter = std::env::args().skip(1);
        while let Some(flag) = iter.next() {
            match flag.as_str() {
                "--topology" => args.topology = Some(value(&mut iter, &flag)?),
                "--seed" => args.seed = parse(&mut iter, &flag)?,
                "--ticks" => args.ticks = parse(&mut iter, &flag)?,
                "--tick-interval" => args.tick_interval_secs = parse(&mut iter, &flag)?,
                "--realtime" => args.realtime_secs = Some(parse(&mut iter, &flag)?),
                "--events" => args.events = parse(&mut iter, &flag)?,
                "--help" | "-h" => {
                    print_usage();
                    process::exit(0);
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(args)
    }
}

fn value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next().ok_or_else(|| format!("{flag} requires a value"))
}

fn parse<T: std::str::FromStr>(
    iter: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T, String> {
    let raw = value(iter, flag)?;
    raw.parse()
        .map_err(|_| format!("{flag}: cannot parse {raw:?}"))
}

fn print_usage() {
    eprintln!(
        "Usage: fleet-simulator [OPTIONS]

Options:
  --topology FILE        Route feed JSON (fallback network if absent/invalid)
  --seed N               RNG seed (default 42)
  --ticks N              Number of ticks to step (default 60)
  --tick-interval SECS   Seconds per tick (default 1.0)
  --realtime SECS        Run the background clock for SECS instead of stepping
  --events N             Number of recent events to print (default 10)"
    );
}

fn run(args: Args) -> Result<(), String> {
    let config = SimulationConfig {
        rng_seed: args.seed,
        tick_interval_secs: args.tick_interval_secs,
        ..Default::default()
    };

    let catalog = RouteCatalog::load(args.topology.as_deref().map(Path::new));
    eprintln!("loaded {} routes", catalog.len());

    let service = FleetService::new(catalog, config).map_err(|e| e.to_string())?;

    match args.realtime_secs {
        Some(secs) => {
            service.start();
            std::thread::sleep(Duration::from_secs_f64(secs.max(0.0)));
            if !service.stop() {
                eprintln!("warning: clock did not stop within the shutdown timeout");
            }
        }
        None => {
            for _ in 0..args.ticks {
                service.step(args.tick_interval_secs);
            }
        }
    }

    eprintln!("simulated {} ticks", service.current_tick());

    let report = serde_json::json!({
        "kpis": service.kpis(),
        "buses": service.snapshot_buses(),
        "routes": service.route_analytics(),
        "temporal_patterns": service.temporal_patterns(),
        "recent_events": service.recent_events(args.events),
    });
    let rendered =
        serde_json::to_string_pretty(&report).map_err(|e| format!("serialization failed: {e}"))?;
    println!("{rendered}");

    Ok(())
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            process::exit(2);
        }
    };

    if let Err(message) = run(args) {
        eprintln!("error: {message}");
        process::exit(1);
    }
}
