//! Local host name resolution.

use std::ffi::OsString;
use std::io;

use crate::error::BootstrapError;
use tracing::debug;

/// Returned when every lookup strategy fails.
pub const UNKNOWN_HOST: &str = "UnknownHost";

/// Environment variable consulted before the resolver.
pub const COMPUTERNAME_ENV: &str = "COMPUTERNAME";

/// Source of the host machine's name.
pub trait HostProbe {
    /// Host name; never empty and never fails.
    fn host_name(&self) -> String;
}

/// Resolves the name from `COMPUTERNAME` or the platform resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostProbe;

impl HostProbe for SystemHostProbe {
    fn host_name(&self) -> String {
        let computer_name = std::env::var(COMPUTERNAME_ENV).ok();
        resolve_host_name(computer_name, hostname::get)
    }
}

/// Fixed host name, for embedding and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHost(pub String);

impl HostProbe for StaticHost {
    fn host_name(&self) -> String {
        self.0.clone()
    }
}

/// Apply the lookup order to an optional `COMPUTERNAME` value and a resolver.
///
/// The resolver is only invoked when `COMPUTERNAME` is absent or empty.
pub fn resolve_host_name<F>(computer_name: Option<String>, lookup: F) -> String
where
    F: FnOnce() -> io::Result<OsString>,
{
    if let Some(name) = computer_name.filter(|n| !n.is_empty()) {
        return name;
    }

    match lookup() {
        Ok(name) => {
            let name = name.to_string_lossy().to_string();
            if name.is_empty() {
                debug!("resolver returned an empty host name");
                UNKNOWN_HOST.to_string()
            } else {
                name
            }
        }
        Err(e) => {
            let message = e.to_string();
            let host = host_from_lookup_error(&message)
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN_HOST.to_string());
            debug!(host = %host, "{}", BootstrapError::HostLookupFailed(message));
            host
        }
    }
}

/// Extract `<name>` from a resolver message shaped like `"<name>: <detail>"`.
fn host_from_lookup_error(message: &str) -> Option<&str> {
    match message.find(':') {
        Some(colon) if colon > 0 => Some(&message[..colon]),
        _ => None,
    }
}
