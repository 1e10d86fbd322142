//! Application name and agent id resolution.
//!
//! Explicit `-Dpinpoint.applicationName` / `-Dpinpoint.agentId` values win
//! when they pass the id policy. Otherwise the application name comes from
//! the profiler config and the agent id is synthesized from the host name
//! followed by the head of the application name. Synthesized values are
//! written back to the property bag so later readers see the same ids.

use crate::config::ProfilerConfig;
use crate::error::{BootstrapError, Result};
use crate::host::HostProbe;
use crate::id_format::{self, MAX_ID_LENGTH};
use crate::product;
use crate::properties::PropertyBag;
use tracing::{info, warn};

/// Longest host fragment kept in a synthesized agent id.
pub const MAX_HOSTNAME_LENGTH: usize = 15;

/// Derives and validates the agent identity.
pub struct IdResolver<'a> {
    properties: &'a mut dyn PropertyBag,
    host: &'a dyn HostProbe,
}

impl<'a> IdResolver<'a> {
    pub fn new(properties: &'a mut dyn PropertyBag, host: &'a dyn HostProbe) -> Self {
        Self { properties, host }
    }

    /// Resolve the application name, `None` when neither the property nor
    /// the config default yields one.
    pub fn application_name(&mut self, config: &dyn ProfilerConfig) -> Option<String> {
        let key = product::APPLICATION_NAME_KEY;
        if let Some(name) = self.valid_id(key, MAX_ID_LENGTH) {
            return Some(name);
        }

        let default = match config.application_name().filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => {
                warn!("-D{} not set and config has no application name", key);
                return None;
            }
        };
        let name = id_format::truncate(&default, MAX_ID_LENGTH).to_string();
        self.properties.set(key, &name);
        warn!("-D{} not set, use applicationName: {}", key, name);
        Some(name)
    }

    /// Resolve the agent id for `application_name`.
    ///
    /// The synthesized candidate is stored before it is validated, so a
    /// rejected id stays visible under `pinpoint.agentId`.
    pub fn agent_id(&mut self, application_name: &str) -> Option<String> {
        let key = product::AGENT_ID_KEY;
        if let Some(id) = self.valid_id(key, MAX_ID_LENGTH) {
            return Some(id);
        }

        let host = self.host.host_name();
        let app_head = id_format::truncate(application_name, MAX_ID_LENGTH - MAX_HOSTNAME_LENGTH);
        let candidate = format!("{}{}", normalize_host(&host), app_head);

        self.properties.set(key, &candidate);
        warn!("-D{} not set, use hostname: {}", key, candidate);

        match check_id(key, candidate, MAX_ID_LENGTH) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Trimmed property value if it passes the id policy.
    fn valid_id(&self, key: &str, max_length: usize) -> Option<String> {
        info!("check -D{}", key);
        match self.checked_property(key, max_length) {
            Ok(value) => {
                info!(
                    "check success. -D{}:{} length:{}",
                    key,
                    value,
                    id_format::length(&value)
                );
                Some(value)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn checked_property(&self, key: &str, max_length: usize) -> Result<String> {
        let value = self
            .properties
            .get_trimmed(key)
            .ok_or_else(|| BootstrapError::MissingProperty(key.to_string()))?;
        check_id(key, value, max_length)
    }
}

/// Pass `value` through unchanged if it satisfies the id policy.
fn check_id(key: &str, value: String, max_length: usize) -> Result<String> {
    match id_format::validate(&value, max_length) {
        Ok(()) => Ok(value),
        Err(reason) => Err(BootstrapError::InvalidId {
            key: key.to_string(),
            value,
            reason,
            max_length,
        }),
    }
}

/// Shorten a host name into an agent id fragment.
///
/// Names within [`MAX_HOSTNAME_LENGTH`] are kept verbatim. Longer names are
/// cut at the first `.`, reduced to ASCII alphanumerics, and if still too
/// long only their last [`MAX_HOSTNAME_LENGTH`] units are kept.
pub fn normalize_host(host: &str) -> String {
    if id_format::length(host) <= MAX_HOSTNAME_LENGTH {
        return host.to_string();
    }

    let short = match host.find('.') {
        Some(dot) => &host[..dot],
        None => host,
    };
    let filtered: String = short.chars().filter(char::is_ascii_alphanumeric).collect();
    id_format::tail(&filtered, MAX_HOSTNAME_LENGTH).to_string()
}

#[cfg(test)]
mod tests;
