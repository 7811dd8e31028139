//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Interface to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Routes command arguments.
#[derive(Debug, Args)]
pub struct RoutesCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Render command arguments.
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Request path, e.g. `/directory?category=restaurants`
    pub path: String,
}

/// Seed command arguments.
#[derive(Debug, Args)]
pub struct SeedCommand {
    /// Delete all existing data first
    #[arg(long)]
    pub reset: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Business claim moderation commands.
#[derive(Debug, Subcommand)]
pub enum ClaimsCommand {
    /// List claims
    List {
        /// Include decided claims
        #[arg(short, long)]
        all: bool,
    },

    /// Approve a claim and hand the listing to the claimant
    Approve {
        /// Claim id
        id: i64,
    },

    /// Reject a claim
    Reject {
        /// Claim id
        id: i64,
    },
}

/// Accreditation application moderation commands.
#[derive(Debug, Subcommand)]
pub enum AccreditationCommand {
    /// List applications
    List {
        /// Include decided applications
        #[arg(short, long)]
        all: bool,
    },

    /// Approve an application and accredit the business
    Approve {
        /// Application id
        id: i64,
    },

    /// Deny an application
    Deny {
        /// Application id
        id: i64,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
