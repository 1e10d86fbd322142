//! Termination signals relayed to the host application.
//!
//! While the launcher waits for the host, a listener thread receives the
//! termination signals and forwards each one to the host process. The host
//! then exits on its own terms and the launcher still reaches its shutdown
//! hooks.

use std::io;
use std::process::Child;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::thread::{self, JoinHandle};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use tracing::{error, info, warn};

use crate::exit_codes;

/// Signals relayed to the host application.
pub const FORWARDED_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Listener forwarding [`FORWARDED_SIGNALS`] to one host process.
pub struct SignalForwarder {
    handle: Handle,
    last_signal: Arc<AtomicI32>,
    thread: Option<JoinHandle<()>>,
}

impl SignalForwarder {
    /// Install the signal handlers and start relaying to `host_pid`.
    pub fn install(host_pid: u32) -> io::Result<Self> {
        let mut signals = Signals::new(FORWARDED_SIGNALS)?;
        let handle = signals.handle();
        let last_signal = Arc::new(AtomicI32::new(0));

        let recorded = Arc::clone(&last_signal);
        let thread = thread::Builder::new()
            .name("pinpoint-signals".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    info!(signal, host_pid, "shutdown signal received, forwarding to host");
                    recorded.store(signal, Ordering::SeqCst);
                    forward(host_pid, signal);
                }
            })?;

        Ok(Self {
            handle,
            last_signal,
            thread: Some(thread),
        })
    }

    /// Last signal relayed so far.
    pub fn received(&self) -> Option<i32> {
        match self.last_signal.load(Ordering::SeqCst) {
            0 => None,
            signal => Some(signal),
        }
    }

    /// Stop listening and return the last relayed signal.
    pub fn finish(mut self) -> Option<i32> {
        self.shutdown();
        self.received()
    }

    fn shutdown(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("signal listener panicked");
        }
    }
}

impl Drop for SignalForwarder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wait for the host and pick the launcher's exit code.
///
/// A relayed signal wins over the host's own status, so a launcher stopped
/// by signal N exits with `128 + N`.
pub fn wait_for_host(host: &mut Child, forwarder: Option<SignalForwarder>) -> i32 {
    let status = host.wait();
    let signal = forwarder.and_then(SignalForwarder::finish);
    match (signal, status) {
        (Some(signal), _) => exit_codes::from_signal(signal),
        (None, Ok(status)) => exit_codes::from_status(status),
        (None, Err(e)) => {
            error!("failed to wait for host application: {}", e);
            exit_codes::LAUNCH_FAILURE
        }
    }
}

fn forward(host_pid: u32, signal: i32) {
    let (Ok(pid), Ok(signal)) = (i32::try_from(host_pid), Signal::try_from(signal)) else {
        warn!(signal, host_pid, "signal cannot be forwarded");
        return;
    };
    if let Err(errno) = kill(Pid::from_raw(pid), signal) {
        warn!(%errno, host_pid, "failed to forward {} to host", signal.as_str());
    }
}
