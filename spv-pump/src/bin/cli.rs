//! Command-line interface for SPV pool pumps.
//!
//! Talks directly to the pump's CGI endpoint. The pump is selected with
//! the SPV_PUMP_HOST environment variable.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use spv_pump::tracing::prelude::*;
use spv_pump::{Client, ClientConfig, PumpSettings, PumpState};

fn usage() {
    eprintln!("Usage: spv-cli <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status [--json]       Show live pump status");
    eprintln!("  settings [--json]     Show pump settings and schedules");
    eprintln!("  speed <rpm>           Set the running speed");
    eprintln!("  on                    Start the pump");
    eprintln!("  off                   Stop the pump");
    eprintln!("  get <name>            Read one parameter");
    eprintln!("  set <name> <value>    Write one parameter (validated)");
    eprintln!("  params                List settable parameters");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SPV_PUMP_HOST           Pump address, e.g. 192.168.1.54 (required)");
    eprintln!("  SPV_PUMP_TIMEOUT_SECS   Request timeout in seconds (default: 5)");
    eprintln!("  RUST_LOG                Log filter (default: info)");
}

#[tokio::main]
async fn main() -> Result<()> {
    spv_pump::tracing::init_cli();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];
    let json = rest.iter().any(|a| a == "--json");

    match (command, rest) {
        ("status", _) => cmd_status(json).await?,
        ("settings", _) => cmd_settings(json).await?,
        ("speed", [rpm]) => {
            let rpm: i64 = rpm.parse().with_context(|| format!("invalid speed: {rpm}"))?;
            report(make_client()?.set_speed(rpm).await?)
        }
        ("on", []) => report(make_client()?.turn_on().await?),
        ("off", []) => report(make_client()?.turn_off().await?),
        ("get", [name]) => {
            let body = make_client()?.get_parameter(name).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        ("set", [name, raw]) => cmd_set(name, raw).await?,
        ("params", []) => cmd_params(),
        _ => {
            eprintln!("Unknown command or wrong arguments: {}", args[1..].join(" "));
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build a client from SPV_PUMP_HOST and SPV_PUMP_TIMEOUT_SECS.
fn make_client() -> Result<Client> {
    let host = env::var("SPV_PUMP_HOST").context("SPV_PUMP_HOST is not set")?;
    let mut config = ClientConfig::new(host);

    if let Ok(secs) = env::var("SPV_PUMP_TIMEOUT_SECS") {
        let secs: u64 = secs
            .parse()
            .with_context(|| format!("invalid SPV_PUMP_TIMEOUT_SECS: {secs}"))?;
        config = config.with_timeout(Duration::from_secs(secs));
    }

    debug!(url = %config.endpoint_url(), timeout = ?config.timeout, "Using pump");
    Ok(Client::new(config))
}

fn report(confirmed: bool) {
    if confirmed {
        println!("OK");
    } else {
        // Not an error: the pump answered but did not echo the new value.
        println!("Not confirmed by pump");
        std::process::exit(2);
    }
}

async fn cmd_status(json: bool) -> Result<()> {
    let state = make_client()?.pump_state().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_state(&state);
    }
    Ok(())
}

fn print_state(state: &PumpState) {
    println!("Model:     {}", state.model);
    println!("Clock:     {}", state.clock);
    println!("Running:   {}", if state.running { "yes" } else { "no" });
    println!("Speed:     {} rpm (preset {})", state.current_speed, state.speed_preset);
    println!("Power:     {} W", state.current_power);
    println!("Flow:      {}", state.current_flow);
    println!("Temp:      {} °C", state.temperature);
    println!("Schedule:  {}", state.schedule);
    println!("Free mode: {}", if state.free_mode { "on" } else { "off" });
    if state.fault {
        println!("Fault:     code {}", state.fault_code);
    }
}

async fn cmd_settings(json: bool) -> Result<()> {
    let settings = make_client()?.pump_settings().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        print_settings(&settings);
    }
    Ok(())
}

fn print_settings(settings: &PumpSettings) {
    println!(
        "Clock:    {:02}:{:02}",
        settings.clock.hour, settings.clock.minute
    );
    println!("Running:  {}", if settings.running { "yes" } else { "no" });
    println!(
        "Speed:    {} rpm (preset {})",
        settings.speed, settings.speed_preset
    );

    println!("Presets:");
    for (i, preset) in settings.speed_presets.iter().enumerate() {
        println!("  {}. {:>5} rpm  {}", i + 1, preset.speed, preset.title);
    }

    println!("Schedules:");
    for (i, sch) in settings.schedules.iter().enumerate() {
        println!(
            "  {}. [{}] {:02}:{:02}-{:02}:{:02} preset {}  {}",
            i + 1,
            if sch.enabled { "x" } else { " " },
            sch.on.hour,
            sch.on.minute,
            sch.off.hour,
            sch.off.minute,
            sch.speed_preset,
            sch.title
        );
    }

    let freeze = &settings.freeze_protection;
    println!(
        "Freeze:   {} (below {} °C, {} rpm for {} h)",
        if freeze.enabled { "on" } else { "off" },
        freeze.trigger_temperature,
        freeze.speed,
        freeze.lasting_hours
    );
    println!(
        "Language: {} ({})",
        settings.language.code, settings.language.index
    );
}

async fn cmd_set(name: &str, raw: &str) -> Result<()> {
    let client = make_client()?;
    let Some(domain) = client.registry().get(name) else {
        bail!("unknown parameter: {name} (see `spv-cli params`)");
    };
    let value = domain.parse_value(raw);
    report(client.set_parameter(name, value).await?);
    Ok(())
}

fn cmd_params() {
    for (name, domain) in spv_pump::Registry::default().iter() {
        println!("{name:<20} {domain}");
    }
}
