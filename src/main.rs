// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the application state from the persisted configuration
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success/online, 1 = offline, 2 = error)
//
// All user-facing output lives in this file; the inner modules report
// through return values and the status sink, never by printing.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod app;      // src/app.rs - application state and lifecycle
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config/ - persisted server URL
mod endpoint; // src/endpoint/ - URL normalization, validation, links
mod probe;    // src/probe/ - reachability probing

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use app::AppState;
use cli::{Cli, Commands};
use config::ConfigStore;
use probe::{LatestWins, Prober, ReachabilityStatus, StatusSink};

// The #[tokio::main] attribute transforms our async main into a real main
// function - it creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Unexpected error: print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Main application logic
// Returns:
//   Ok(0) = success / server online
//   Ok(1) = server offline
//   Ok(2) = not configured
//   Err   = invalid input or internal error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Set {
            server_url,
            primary_port,
            secondary_port,
        } => handle_set(&server_url, primary_port, secondary_port),
        Commands::Clear => handle_clear(),
        Commands::Links {
            json,
            primary_port,
            secondary_port,
        } => handle_links(json, primary_port, secondary_port),
        Commands::Status {
            json,
            primary_port,
            secondary_port,
        } => handle_status(json, primary_port, secondary_port).await,
        Commands::Watch {
            interval,
            primary_port,
            secondary_port,
        } => handle_watch(interval, primary_port, secondary_port).await,
    }
}

// Handles the 'set' subcommand
//
// Validation happens inside update_endpoint: invalid input errors out
// before anything is written, so a bad update never clobbers a good
// configuration.
fn handle_set(server_url: &str, primary_port: u16, secondary_port: u16) -> Result<i32> {
    let mut state = load_state(primary_port, secondary_port)?;

    let links = state.update_endpoint(server_url)?;

    println!("✅ Server URL saved: {}", server_url);
    println!("🎬 Media server:    {}", links.primary_url);
    println!("📨 Request manager: {}", links.secondary_url);

    Ok(0)
}

// Handles the 'clear' subcommand
fn handle_clear() -> Result<i32> {
    let mut state = load_state(
        endpoint::DEFAULT_PRIMARY_PORT,
        endpoint::DEFAULT_SECONDARY_PORT,
    )?;

    state.clear_endpoint()?;
    println!("🗑️  Server configuration cleared");

    Ok(0)
}

// Handles the 'links' subcommand
fn handle_links(json: bool, primary_port: u16, secondary_port: u16) -> Result<i32> {
    let state = load_state(primary_port, secondary_port)?;

    match state.links() {
        Some(links) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&links)?);
            } else {
                println!("🎬 Media server:    {}", links.primary_url);
                println!("📨 Request manager: {}", links.secondary_url);
            }
            Ok(0)
        }
        None => {
            if json {
                println!("{}", serde_json::json!({ "configured": false }));
            } else {
                print_unconfigured();
            }
            Ok(2)
        }
    }
}

// Handles the 'status' subcommand
//
// One probe, one report. In human mode the sink prints each emission as
// it happens (Checking first, then the verdict); in JSON mode the sink
// stays quiet and only the final report is printed.
async fn handle_status(json: bool, primary_port: u16, secondary_port: u16) -> Result<i32> {
    let mut state = load_state(primary_port, secondary_port)?;

    if state.endpoint().is_none() {
        if json {
            println!("{}", serde_json::json!({ "configured": false }));
        } else {
            print_unconfigured();
        }
        return Ok(2);
    }

    let prober = Prober::new();

    let status = if json {
        let sink = LatestWins::new(|_: ReachabilityStatus| {});
        state.refresh(&prober, &sink).await?
    } else {
        let sink = LatestWins::new(|status: ReachabilityStatus| {
            println!("{}", format_status(status));
        });
        state.refresh(&prober, &sink).await?
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "configured": true,
                "status": status,
                "links": state.links(),
            }))?
        );
    }

    Ok(exit_code_for(status))
}

// Handles the 'watch' subcommand
//
// Probes on a fixed cadence until Ctrl+C. The sink and its sequence
// gating live for the whole session, so even if probes ever overlapped
// the newest one would win at the terminal.
async fn handle_watch(interval: u64, primary_port: u16, secondary_port: u16) -> Result<i32> {
    let mut state = load_state(primary_port, secondary_port)?;

    let Some(endpoint) = state.endpoint().cloned() else {
        print_unconfigured();
        return Ok(2);
    };

    println!(
        "👀 Watching {} every {}s (Ctrl+C to stop)\n",
        endpoint.host, interval
    );

    let prober = Prober::new();
    let sink = LatestWins::new(|status: ReachabilityStatus| {
        println!("{}", format_status(status));
    });

    tokio::select! {
        result = watch_loop(&mut state, &prober, &sink, interval) => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("\n👋 Stopped watching");
        }
    }

    Ok(0)
}

// The periodic probe loop; only Ctrl+C (handled by the caller) ends it
async fn watch_loop<S: StatusSink>(
    state: &mut AppState,
    prober: &Prober,
    sink: &LatestWins<S>,
    interval: u64,
) -> Result<()> {
    // interval(0) would panic; clamp to at least one second
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    loop {
        ticker.tick().await;
        state.refresh(prober, sink).await?;
    }
}

// Loads the application state from the default config location
fn load_state(primary_port: u16, secondary_port: u16) -> Result<AppState> {
    let store = ConfigStore::default_location()?;
    AppState::load(store, primary_port, secondary_port)
}

fn print_unconfigured() {
    println!("⚠️  No server configured");
    println!("   Links are inactive - run 'stream-sentry set <url>' to activate them");
}

// Formats the status enum for the terminal
fn format_status(status: ReachabilityStatus) -> &'static str {
    match status {
        ReachabilityStatus::Checking => "⏳ CHECKING",
        ReachabilityStatus::Online => "🟢 ONLINE",
        ReachabilityStatus::Offline => "🔴 OFFLINE",
    }
}

// Maps a terminal status to the process exit code
fn exit_code_for(status: ReachabilityStatus) -> i32 {
    match status {
        ReachabilityStatus::Online => 0,
        // Checking never reaches here - refresh only returns terminal
        // classifications - but the match must be total
        ReachabilityStatus::Checking | ReachabilityStatus::Offline => 1,
    }
}
