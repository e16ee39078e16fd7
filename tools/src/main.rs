//! clock-runner: headless host for the world clock dashboard.
//!
//! Usage:
//!   clock-runner --data-dir ./data
//!   clock-runner --data-dir ./data --ticks 5 --period-ms 200
//!   clock-runner --at 2025-08-24T10:00:00Z --ticks 1
//!   clock-runner --ipc-mode

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::env;
use std::io::{self, BufRead, Write};
use worldclock_core::{
    clock::{FixedTimeSource, SystemTimeSource, TimeSource},
    config::DashboardConfig,
    engine::DashboardEngine,
    render::MemorySurface,
    scheduler::Scheduler,
    types::Tick,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    tick: Tick,
    at: Option<DateTime<Utc>>,
    surface: &'a MemorySurface,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = parse_arg(&args, "--ticks", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let frozen_at: Option<DateTime<Utc>> = args
        .windows(2)
        .find(|w| w[0] == "--at")
        .map(|w| DateTime::parse_from_rfc3339(&w[1]).map(|t| t.with_timezone(&Utc)))
        .transpose()?;

    let mut config = DashboardConfig::load(data_dir)?;
    config.tick_period_ms = parse_arg(&args, "--period-ms", config.tick_period_ms);

    let mut engine = DashboardEngine::build(config)?;
    let mut surface = MemorySurface::new();

    let time: Box<dyn TimeSource> = match frozen_at {
        Some(at) => Box::new(FixedTimeSource(at)),
        None => Box::new(SystemTimeSource),
    };

    if ipc_mode {
        return run_ipc_loop(&mut engine, &mut surface, time.as_ref());
    }

    println!("World Clock — clock-runner");
    println!("  data_dir:  {data_dir}");
    println!("  cards:     {}", engine.registry().len());
    println!("  period:    {:?}", engine.tick_period());
    println!("  ticks:     {}", if ticks == 0 { "until interrupted".to_string() } else { ticks.to_string() });
    println!();

    let scheduler = Scheduler::for_engine(&engine);
    let stop = scheduler.stop_handle();
    scheduler.start(&mut engine, &mut surface, time.as_ref(), |engine, surface, _events| {
        print_frame(engine, surface);
        if ticks != 0 && engine.clock.current_tick >= ticks {
            stop.stop();
        }
    });

    Ok(())
}

fn run_ipc_loop(
    engine: &mut DashboardEngine,
    surface: &mut MemorySurface,
    time: &dyn TimeSource,
) -> Result<()> {
    log::info!("ipc mode: reading commands from stdin");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unknown command: {}", buffer.trim());
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                engine.run_ticks(count, time, &mut *surface);
            }
            IpcCommand::GetState => {}
        }

        let state = UiState {
            tick: engine.clock.current_tick,
            at: engine.clock.last_instant,
            surface: &*surface,
        };
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_frame(engine: &DashboardEngine, surface: &MemorySurface) {
    let at = engine
        .clock
        .last_instant
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    println!("=== TICK {} ({at}) ===", engine.clock.current_tick);

    for entry in engine.registry().iter() {
        let Some(frame) = surface.card(&entry.card.id) else { continue };
        let Some(labels) = &frame.labels else { continue };
        let palette = &engine.config().palette;
        let (shade, red) = match &frame.style {
            Some(style) => {
                let shade = if entry.is_reference {
                    "ref"
                } else if style.background == palette.day_background {
                    "day"
                } else {
                    "night"
                };
                (shade, style.time_color.as_ref() == Some(&palette.red_text))
            }
            None => ("-", false),
        };
        println!(
            "  {:<34} {:>8}  {:<9}  {:<15} {:<5} {}",
            entry.card.name,
            labels.time,
            labels.utc,
            labels.date,
            shade,
            if red { "RED" } else { "" }
        );
    }
    println!();
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
