// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The subcommands mirror the actions a user takes against their media
// box: configure it, look at the links, check whether it is up, keep
// watching it, or forget it.
// =============================================================================

use clap::{Parser, Subcommand};

use crate::endpoint::{DEFAULT_PRIMARY_PORT, DEFAULT_SECONDARY_PORT};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "stream-sentry",
    version = "0.3.0",
    about = "Manage and monitor links to your self-hosted media services",
    long_about = "stream-sentry keeps track of your media box: configure its URL once, \
                  then print the service links or check whether the server is reachable. \
                  The media server is expected on the primary port (default 32400) and \
                  the request manager on the secondary port (default 5055)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// The subcommands the user can run
//
// Each variant's fields become that subcommand's arguments.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate and save the server URL, then print the service links
    ///
    /// Example: stream-sentry set myserver.duckdns.org
    Set {
        /// Server URL or bare hostname (http:// is assumed when no
        /// scheme is given)
        server_url: String,

        /// Media server port
        #[arg(long, default_value_t = DEFAULT_PRIMARY_PORT)]
        primary_port: u16,

        /// Request manager port
        #[arg(long, default_value_t = DEFAULT_SECONDARY_PORT)]
        secondary_port: u16,
    },

    /// Forget the saved server URL
    Clear,

    /// Print the service links for the configured server
    Links {
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,

        /// Media server port
        #[arg(long, default_value_t = DEFAULT_PRIMARY_PORT)]
        primary_port: u16,

        /// Request manager port
        #[arg(long, default_value_t = DEFAULT_SECONDARY_PORT)]
        secondary_port: u16,
    },

    /// Probe the configured server once and report its status
    ///
    /// Exit code 0 = online, 1 = offline, 2 = not configured
    Status {
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,

        /// Media server port
        #[arg(long, default_value_t = DEFAULT_PRIMARY_PORT)]
        primary_port: u16,

        /// Request manager port
        #[arg(long, default_value_t = DEFAULT_SECONDARY_PORT)]
        secondary_port: u16,
    },

    /// Probe the configured server repeatedly until interrupted
    ///
    /// Example: stream-sentry watch --interval 30
    Watch {
        /// Seconds between probes
        #[arg(long, default_value_t = 30)]
        interval: u64,

        /// Media server port
        #[arg(long, default_value_t = DEFAULT_PRIMARY_PORT)]
        primary_port: u16,

        /// Request manager port
        #[arg(long, default_value_t = DEFAULT_SECONDARY_PORT)]
        secondary_port: u16,
    },
}
