//! Isolated namespace the profiler is loaded into.
//!
//! A namespace is built from an explicit library list. Class names under the
//! [`PROFILER_LIBS`] packages are delegated to the parent namespace; every
//! other class resolves from the namespace's own libraries.

mod process;

pub use process::{LIBS_ENV, OPTION_ENV, ProcessAgent, ProcessLoader, ProcessNamespace};

use crate::agent::{Agent, AgentOption, AgentType};
use crate::error::{BootstrapError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the namespace the profiler is booted in.
pub const AGENT_NAMESPACE: &str = "pinpoint.agent";

/// Packages always resolved through the parent namespace.
pub const PROFILER_LIBS: &[&str] = &[
    "com.navercorp.pinpoint.bootstrap",
    "com.navercorp.pinpoint.common",
    "com.navercorp.pinpoint.exception",
    "com.navercorp.pinpoint.io",
    "com.navercorp.pinpoint.loader",
];

/// Libraries only placed on the path in plugin-test mode.
pub const TEST_LIB_PATTERNS: &[&str] = &["**/*pinpoint-profiler-test*"];

/// Parameters for a new namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSpec {
    pub name: String,
    pub libs: Vec<PathBuf>,
    /// `None` delegates to the root namespace.
    pub parent: Option<String>,
    pub delegated_packages: Vec<String>,
}

impl NamespaceSpec {
    /// Spec for the agent namespace with the standard delegation list.
    pub fn agent(libs: Vec<PathBuf>, parent: Option<String>) -> Self {
        Self {
            name: AGENT_NAMESPACE.to_string(),
            libs,
            parent,
            delegated_packages: PROFILER_LIBS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether `class_name` is resolved by the parent namespace.
    pub fn delegates(&self, class_name: &str) -> bool {
        self.delegated_packages.iter().any(|package| {
            class_name
                .strip_prefix(package.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

/// A created namespace able to boot a profiler class.
pub trait AgentNamespace: fmt::Debug {
    fn spec(&self) -> &NamespaceSpec;

    /// Load `boot_class` and hand it `option`. The returned agent is not yet
    /// started.
    fn boot(&self, boot_class: &str, option: AgentOption) -> anyhow::Result<Arc<dyn Agent>>;
}

/// Creates isolated namespaces.
pub trait AgentLoader {
    fn create_namespace(&self, spec: NamespaceSpec) -> anyhow::Result<Box<dyn AgentNamespace>>;
}

/// Bridge to a host module system that must learn about the new namespace.
pub trait ModuleBridge {
    fn define_agent_module(&self, namespace: &dyn AgentNamespace) -> anyhow::Result<()>;
}

/// Drop test-only libraries unless `agent_type` asks for them.
pub fn select_libs(libs: &[PathBuf], agent_type: AgentType) -> Result<Vec<PathBuf>> {
    if agent_type.includes_test_libs() {
        tracing::info!("load {} lib", agent_type);
        return Ok(libs.to_vec());
    }

    let test_libs = build_globset(TEST_LIB_PATTERNS)?;
    Ok(libs
        .iter()
        .filter(|lib| !test_libs.is_match(lib))
        .cloned()
        .collect())
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            BootstrapError::unexpected(format!("invalid library pattern '{}'", pattern), e.into())
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| BootstrapError::unexpected("failed to build library patterns", e.into()))
}
