//! Namespace realised as a child process.
//!
//! The boot class names an executable among the namespace libraries. Starting
//! the agent spawns it with the serialized [`AgentOption`] in
//! [`OPTION_ENV`] and the namespace library path in [`LIBS_ENV`].

use super::{AgentLoader, AgentNamespace, NamespaceSpec};
use crate::agent::{Agent, AgentOption};
use anyhow::{Context, anyhow, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Environment variable carrying the JSON agent manifest.
pub const OPTION_ENV: &str = "PINPOINT_AGENT_OPTION";

/// Environment variable carrying the namespace library path.
pub const LIBS_ENV: &str = "PINPOINT_AGENT_LIBS";

/// Time the agent process gets to exit after SIGTERM before it is killed.
pub const STOP_GRACE: Duration = Duration::from_secs(5);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Creates [`ProcessNamespace`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLoader;

impl AgentLoader for ProcessLoader {
    fn create_namespace(&self, spec: NamespaceSpec) -> anyhow::Result<Box<dyn AgentNamespace>> {
        for lib in &spec.libs {
            if !lib.exists() {
                bail!("namespace library '{}' does not exist", lib.display());
            }
        }
        Ok(Box::new(ProcessNamespace { spec }))
    }
}

#[derive(Debug)]
pub struct ProcessNamespace {
    spec: NamespaceSpec,
}

/// JSON shape handed to the profiler process.
#[derive(Debug, Serialize)]
struct AgentManifest<'a> {
    namespace: &'a str,
    boot_class: &'a str,
    agent_id: &'a str,
    application_name: &'a str,
    container: bool,
    target_pid: u32,
    config_path: Option<&'a Path>,
    plugin_jars: &'a [PathBuf],
    boot_jars: &'a [PathBuf],
    delegated_packages: &'a [String],
    properties: &'a BTreeMap<String, String>,
}

impl ProcessNamespace {
    /// Resolve `boot_class` and build the not yet started agent process.
    pub fn prepare(&self, boot_class: &str, option: &AgentOption) -> anyhow::Result<ProcessAgent> {
        if self.spec.delegates(boot_class) {
            bail!(
                "boot class {} belongs to a package delegated to the parent namespace",
                boot_class
            );
        }
        let program = self.find_program(boot_class).ok_or_else(|| {
            anyhow!(
                "boot class {} not found in namespace {}",
                boot_class,
                self.spec.name
            )
        })?;

        let manifest = AgentManifest {
            namespace: &self.spec.name,
            boot_class,
            agent_id: &option.agent_id,
            application_name: &option.application_name,
            container: option.is_container,
            target_pid: option.instrumentation.target_pid(),
            config_path: option.profiler_config.path(),
            plugin_jars: &option.plugin_jars,
            boot_jars: &option.boot_jars,
            delegated_packages: &self.spec.delegated_packages,
            properties: &option.properties,
        };
        let manifest =
            serde_json::to_string(&manifest).context("failed to serialize agent option")?;
        let lib_path =
            std::env::join_paths(&self.spec.libs).context("failed to join namespace libraries")?;

        Ok(ProcessAgent::new(
            program.to_path_buf(),
            vec![
                (OPTION_ENV.to_string(), OsString::from(manifest)),
                (LIBS_ENV.to_string(), lib_path),
            ],
        ))
    }

    /// Library whose file name, without extension, equals `boot_class`.
    fn find_program(&self, boot_class: &str) -> Option<&Path> {
        self.spec
            .libs
            .iter()
            .find(|lib| {
                lib.file_name().is_some_and(|n| n == boot_class)
                    || (lib.extension().is_some_and(|e| e == "exe")
                        && lib.file_stem().is_some_and(|s| s == boot_class))
            })
            .map(PathBuf::as_path)
    }
}

impl AgentNamespace for ProcessNamespace {
    fn spec(&self) -> &NamespaceSpec {
        &self.spec
    }

    fn boot(&self, boot_class: &str, option: AgentOption) -> anyhow::Result<Arc<dyn Agent>> {
        Ok(Arc::new(self.prepare(boot_class, &option)?))
    }
}

/// Profiler running as a child process.
#[derive(Debug)]
pub struct ProcessAgent {
    program: PathBuf,
    env: Vec<(String, OsString)>,
    child: Mutex<Option<Child>>,
    grace: Duration,
}

impl ProcessAgent {
    fn new(program: PathBuf, env: Vec<(String, OsString)>) -> Self {
        Self {
            program,
            env,
            child: Mutex::new(None),
            grace: STOP_GRACE,
        }
    }

    /// Override how long `stop` waits after SIGTERM.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Value passed to the child for environment variable `key`.
    pub fn env(&self, key: &str) -> Option<&OsString> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl Agent for ProcessAgent {
    fn start(&self) -> anyhow::Result<()> {
        let mut child = self.child.lock().unwrap_or_else(|poison| poison.into_inner());
        if child.is_some() {
            bail!("agent {} already started", self.program.display());
        }

        let spawned = Command::new(&self.program)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn agent {}", self.program.display()))?;
        info!(pid = spawned.id(), program = %self.program.display(), "agent process started");
        *child = Some(spawned);
        Ok(())
    }

    fn stop(&self) {
        let mut child = self.child.lock().unwrap_or_else(|poison| poison.into_inner());
        let Some(mut running) = child.take() else {
            return;
        };

        request_stop(&running);
        if let Some(status) = wait_with_grace(&mut running, self.grace) {
            info!(%status, "agent process stopped");
            return;
        }

        warn!(
            grace_ms = self.grace.as_millis(),
            "agent process ignored stop request, killing"
        );
        // Already exited is fine; reaping below still collects the status.
        if let Err(e) = running.kill() {
            warn!(error = %e, "failed to kill agent process");
        }
        match running.wait() {
            Ok(status) => info!(%status, "agent process killed"),
            Err(e) => warn!(error = %e, "failed to reap agent process"),
        }
    }
}

/// Ask the agent process to shut down.
#[cfg(unix)]
fn request_stop(child: &Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Ok(pid) = i32::try_from(child.id()) else {
        return;
    };
    if let Err(errno) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
        tracing::debug!(pid, %errno, "SIGTERM not delivered to agent process");
    }
}

/// No cooperative signal exists; the grace wait only reaps an exited child.
#[cfg(not(unix))]
fn request_stop(_child: &Child) {}

/// Poll for exit until `grace` elapses.
fn wait_with_grace(child: &mut Child, grace: Duration) -> Option<std::process::ExitStatus> {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL_INTERVAL),
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to poll agent process");
                return None;
            }
        }
    }
}
