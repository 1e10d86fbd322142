//! Pinpoint bootstrap launcher.
//!
//! Spawns the host application, attaches the agent to it, waits for the host
//! to exit, runs the agent's shutdown hooks and exits with the host's status.
//! Termination signals sent to the launcher are relayed to the host, so the
//! hooks also run when the launcher is asked to stop.

mod cli;

use anyhow::{Context, Result};
use cli::Cli;
use pinpoint_bootstrap::agent::{AgentArgs, HostProcess};
use pinpoint_bootstrap::agent_dir::AgentDirectory;
use pinpoint_bootstrap::loader::ProcessLoader;
use pinpoint_bootstrap::properties::SystemProperties;
use pinpoint_bootstrap::starter::Starter;
use pinpoint_bootstrap::{exit_codes, logging, shutdown};
use std::path::PathBuf;
use std::process::{Child, Command, ExitCode};
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(unix)]
use pinpoint_bootstrap::signals::{self, SignalForwarder};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.log_filter.as_deref());

    SystemProperties.define_all(&cli.defines);

    let mut child = match spawn_host(&cli.command) {
        Ok(child) => child,
        Err(err) => {
            error!("{:#}", err);
            return exit_codes::to_exit_code(exit_codes::LAUNCH_FAILURE);
        }
    };
    info!(pid = child.id(), "host application started");

    #[cfg(unix)]
    let forwarder = match SignalForwarder::install(child.id()) {
        Ok(forwarder) => Some(forwarder),
        Err(err) => {
            warn!("signals will not reach the host application: {}", err);
            None
        }
    };

    if let Err(err) = attach(&cli, child.id()) {
        warn!("agent not attached: {:#}", err);
    }

    #[cfg(unix)]
    let code = signals::wait_for_host(&mut child, forwarder);
    #[cfg(not(unix))]
    let code = wait_for_host(&mut child);

    let hooks = shutdown::run_hooks();
    info!(hooks, code, "host application exited");
    exit_codes::to_exit_code(code)
}

#[cfg(not(unix))]
fn wait_for_host(child: &mut Child) -> i32 {
    match child.wait() {
        Ok(status) => exit_codes::from_status(status),
        Err(err) => {
            error!("failed to wait for host application: {}", err);
            exit_codes::LAUNCH_FAILURE
        }
    }
}

fn spawn_host(command: &[String]) -> Result<Child> {
    let (program, args) = command
        .split_first()
        .context("no host command given")?;
    Command::new(program)
        .args(args)
        .spawn()
        .with_context(|| format!("failed to start host application '{}'", program))
}

/// Bootstrap the agent against the host process. A `false` from the starter
/// has already been logged.
fn attach(cli: &Cli, pid: u32) -> Result<()> {
    let agent_path = match &cli.agent_path {
        Some(path) => path.clone(),
        None => current_exe()?,
    };
    let agent_dir = AgentDirectory::resolve(&agent_path)?;

    let mut starter = Starter::new(
        AgentArgs::parse(&cli.agent_args),
        agent_dir,
        Arc::new(HostProcess { pid }),
        Box::new(ProcessLoader),
    );
    starter.start();
    Ok(())
}

fn current_exe() -> Result<PathBuf> {
    std::env::current_exe().context("failed to locate the bootstrap executable")
}
