//! CLI command definitions for the `ufdr` binary.
//!
//! Uses clap derive macros for argument parsing. Besides `serve`, the
//! commands are diagnostics: embed sample inputs and check store
//! connectivity.

pub mod check;
pub mod embed;

use clap::{Parser, Subcommand};

/// UFDR forensic report assistant backend.
#[derive(Parser)]
#[command(name = "ufdr", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "UFDR_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "localhost")]
        host: String,
    },

    /// Embed sample inputs and print the resulting vectors.
    Embed {
        #[command(subcommand)]
        target: EmbedTarget,
    },

    /// Connect to the vector and graph stores and report their state.
    Check,
}

#[derive(Subcommand)]
pub enum EmbedTarget {
    /// Embed one or more texts.
    Text {
        /// Texts to embed.
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Embed one or more images.
    Image {
        /// Image file paths or http(s) URLs.
        #[arg(required = true)]
        sources: Vec<String>,
    },
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,ufdr=debug",
            _ => "trace",
        }
    }
}
