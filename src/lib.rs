//! Pinpoint agent bootstrap.
//!
//! Resolves the agent home and configuration, derives the application name
//! and agent id, and boots the profiler inside an isolated namespace.

pub mod agent;
pub mod agent_dir;
pub mod config;
pub mod container;
pub mod error;
pub mod exit_codes;
pub mod host;
pub mod id_format;
pub mod id_resolver;
pub mod loader;
pub mod logging;
pub mod product;
pub mod properties;
pub mod shutdown;
#[cfg(unix)]
pub mod signals;
pub mod starter;

#[cfg(test)]
mod test_support;
