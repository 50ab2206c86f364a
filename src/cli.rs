use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{Direction, VehicleType};

/// Command-line interface for the gate pass client
#[derive(Debug, Parser)]
#[command(
    name = "gatepass",
    version = env!("CARGO_PKG_VERSION"),
    about = "Campus vehicle pass client: show QR passes and record gate scans",
    long_about = None
)]
pub struct Cli {
    /// Override the Backend API base URL (otherwise API_BASE_URL)
    #[arg(global = true, long = "api-url")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Guard scanner: read decoded QR payloads from stdin, one per line.
    ///
    /// Lines starting with ':' are commands: `:entry`, `:exit`, `:ack`,
    /// `:records`, `:quit`.
    Scan {
        /// Direction recorded for scans until changed
        #[arg(long, short = 'd')]
        direction: Direction,

        /// Pause after each result until `:ack`
        #[arg(long)]
        ack: bool,
    },

    /// List a user's vehicles and whether each holds a valid pass
    Vehicles {
        #[arg(long)]
        user: i64,
    },

    /// Manage a single vehicle
    Vehicle {
        #[command(subcommand)]
        action: VehicleAction,
    },

    /// Show the current pass of a vehicle and optionally save its QR image
    Pass {
        #[arg(long)]
        vehicle: i64,

        /// Write the QR code to this file (.svg or .png)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Apply for a new pass for a vehicle
    Register {
        #[arg(long)]
        vehicle: i64,
    },

    /// Attendance history of a vehicle
    Records {
        #[arg(long)]
        vehicle: i64,
    },

    /// Distance from the current position to a terminal marker
    Near {
        /// Current latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Current longitude
        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        #[arg(long, allow_hyphen_values = true)]
        terminal_lat: String,

        #[arg(long, allow_hyphen_values = true)]
        terminal_lon: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum VehicleAction {
    /// Add a vehicle for its owner (apply for a pass afterwards with `register`)
    Add {
        /// Owner's user id
        #[arg(long)]
        user: i64,

        #[arg(long)]
        plate: String,

        #[arg(long)]
        make: String,

        #[arg(long)]
        model: String,

        #[arg(long)]
        year: String,

        #[arg(long)]
        color: String,

        /// car, motorcycle or other
        #[arg(long = "type", default_value = "car")]
        vehicle_type: VehicleType,

        /// Vehicle is registered with the LTO
        #[arg(long)]
        registered: bool,
    },
}
