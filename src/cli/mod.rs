//! CLI argument parsing for the launcher.
//!
//! Uses clap derive macros. The launcher has no subcommands: everything after
//! `--` is the host application command line.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Launch an application with the Pinpoint agent attached.
///
/// The agent is bootstrapped against the spawned host process. Bootstrap
/// failures are logged and never prevent the host from running.
#[derive(Parser, Debug)]
#[command(name = "pinpoint-bootstrap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Define a property, e.g. `-D pinpoint.applicationName=shop`.
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub defines: Vec<String>,

    /// Agent arguments as comma-separated `key=value` pairs.
    ///
    /// `AGENT_TYPE=PLUGIN_TEST` selects the plugin test agent.
    #[arg(long, value_name = "ARGS", default_value = "")]
    pub agent_args: String,

    /// Path of the bootstrap artifact inside the agent home.
    ///
    /// Defaults to this executable; its parent directory is the agent home.
    #[arg(long, value_name = "PATH")]
    pub agent_path: Option<PathBuf>,

    /// Log filter (overrides `PINPOINT_LOG`).
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Host application command and its arguments.
    #[arg(last = true, required = true, num_args = 1.., value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    /// Parse arguments from the process command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
