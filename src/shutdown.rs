//! Process shutdown hooks.
//!
//! Hooks registered with [`ProcessShutdownHooks`] are held until
//! [`run_hooks`] is called on the way out of the process. Each hook runs on
//! its own named thread; non-daemon hooks are joined before `run_hooks`
//! returns.

use std::fmt;
use std::sync::{LazyLock, Mutex};
use std::thread;
use tracing::warn;

/// Work to run when the process shuts down.
pub struct ShutdownHook {
    name: String,
    daemon: bool,
    task: Box<dyn FnOnce() + Send + 'static>,
}

impl ShutdownHook {
    pub fn new<F>(name: impl Into<String>, daemon: bool, task: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            name: name.into(),
            daemon,
            task: Box::new(task),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_daemon(&self) -> bool {
        self.daemon
    }

    /// Spawn the hook on a thread named after it.
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        let task = self.task;
        thread::Builder::new().name(self.name).spawn(task)
    }
}

impl fmt::Debug for ShutdownHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHook")
            .field("name", &self.name)
            .field("daemon", &self.daemon)
            .finish_non_exhaustive()
    }
}

/// Receives shutdown hooks.
pub trait ShutdownRegistry {
    fn register(&self, hook: ShutdownHook);
}

static PROCESS_HOOKS: LazyLock<Mutex<Vec<ShutdownHook>>> = LazyLock::new(|| Mutex::new(Vec::new()));

/// Registry backed by the process-wide hook list drained by [`run_hooks`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessShutdownHooks;

impl ShutdownRegistry for ProcessShutdownHooks {
    fn register(&self, hook: ShutdownHook) {
        PROCESS_HOOKS
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(hook);
    }
}

/// Run and drain every registered process hook. Returns how many ran.
pub fn run_hooks() -> usize {
    let hooks = std::mem::take(
        &mut *PROCESS_HOOKS
            .lock()
            .unwrap_or_else(|poison| poison.into_inner()),
    );
    run_all(hooks)
}

/// Start every hook concurrently, then join the non-daemon ones.
pub fn run_all(hooks: Vec<ShutdownHook>) -> usize {
    let mut joinable = Vec::new();
    let mut started = 0;

    for hook in hooks {
        let name = hook.name().to_string();
        let daemon = hook.is_daemon();
        match hook.spawn() {
            Ok(handle) => {
                started += 1;
                if !daemon {
                    joinable.push((name, handle));
                }
            }
            Err(e) => warn!(hook = %name, error = %e, "failed to start shutdown hook"),
        }
    }

    for (name, handle) in joinable {
        if handle.join().is_err() {
            warn!(hook = %name, "shutdown hook panicked");
        }
    }
    started
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn hook_runs_on_named_thread() {
        let seen = Arc::new(Mutex::new(None));
        let seen_in_hook = Arc::clone(&seen);
        let hook = ShutdownHook::new("Pinpoint-shutdown-hook", false, move || {
            *seen_in_hook.lock().unwrap() = thread::current().name().map(str::to_string);
        });

        assert_eq!(run_all(vec![hook]), 1);
        assert_eq!(
            seen.lock().unwrap().as_deref(),
            Some("Pinpoint-shutdown-hook")
        );
    }

    #[test]
    fn non_daemon_hooks_are_joined() {
        let counter = Arc::new(AtomicUsize::new(0));
        let hooks = (0..3)
            .map(|i| {
                let counter = Arc::clone(&counter);
                ShutdownHook::new(format!("hook-{i}"), false, move || {
                    thread::sleep(std::time::Duration::from_millis(10));
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        assert_eq!(run_all(hooks), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_hook_does_not_propagate() {
        let hook = ShutdownHook::new("boom", false, || panic!("hook failure"));
        assert_eq!(run_all(vec![hook]), 1);
    }

    #[test]
    #[serial]
    fn process_hooks_are_drained_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let in_hook = Arc::clone(&counter);
        ProcessShutdownHooks.register(ShutdownHook::new("drain-test", false, move || {
            in_hook.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(run_hooks(), 1);
        assert_eq!(run_hooks(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
