//! CLI module - command-line interface for iot-sim-ops
//!
//! Serves the HTTP API by default; the other subcommands stand in for the
//! provisioning and metering systems that would own users, SIMs and usage.

mod commands;

use clap::{Parser, Subcommand};

/// iot-sim-ops - IoT SIM-card management backend
#[derive(Parser)]
#[command(name = "iot-sim-ops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage SIM cards
    Sim {
        #[command(subcommand)]
        command: SimCommands,
    },

    /// Record monthly usage figures
    Usage {
        #[command(subcommand)]
        command: UsageCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        /// Login name
        username: String,
        /// Initial password
        password: String,
    },
    /// Disable a user; existing tokens stop working
    Disable {
        /// Login name
        username: String,
    },
}

#[derive(Subcommand)]
pub enum SimCommands {
    /// Register a SIM card in ACTIVE state
    Add {
        iccid: String,
        imsi: String,
        msisdn: String,
        /// Username of the owning account
        #[arg(long)]
        owner: String,
    },
    /// Deactivate a SIM card permanently
    Deactivate { iccid: String },
    /// Show the status change history of a SIM card
    #[command(alias = "log")]
    History { iccid: String },
}

#[derive(Subcommand)]
pub enum UsageCommands {
    /// Set base allowance and consumption for a month
    Set {
        iccid: String,
        /// Billing month (YYYY-MM)
        month: String,
        #[arg(long)]
        total_mb: i64,
        #[arg(long)]
        used_mb: i64,
    },
}

pub use commands::*;
