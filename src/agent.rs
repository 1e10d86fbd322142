//! Profiler agent capability and the values handed to it at boot.

use crate::config::ProfilerConfig;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Agent argument selecting the boot variant.
pub const AGENT_TYPE: &str = "AGENT_TYPE";

/// Boot class of the production profiler.
pub const BOOT_CLASS: &str = "com.navercorp.pinpoint.profiler.DefaultAgent";

/// Boot class of the plugin test harness.
pub const PLUGIN_TEST_BOOT_CLASS: &str = "com.navercorp.pinpoint.test.PluginTestAgent";

/// A started profiler. `stop` is invoked once from the shutdown hook.
pub trait Agent: Send + Sync {
    fn start(&self) -> anyhow::Result<()>;

    fn stop(&self);
}

/// Which profiler variant to boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentType {
    /// Production profiler (`DEFAULT_AGENT`).
    #[default]
    Default,
    /// Plugin test harness (`PLUGIN_TEST`).
    PluginTest,
}

impl AgentType {
    /// Parse an agent type; comparison ignores case, unknown values map to
    /// [`AgentType::Default`].
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case(Self::PluginTest.as_str()) {
            Self::PluginTest
        } else {
            Self::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Default => "DEFAULT_AGENT",
            AgentType::PluginTest => "PLUGIN_TEST",
        }
    }

    /// Fully qualified class loaded from the agent namespace.
    pub fn boot_class(&self) -> &'static str {
        match self {
            AgentType::Default => BOOT_CLASS,
            AgentType::PluginTest => PLUGIN_TEST_BOOT_CLASS,
        }
    }

    /// Whether test-only libraries are kept on the namespace path.
    pub fn includes_test_libs(&self) -> bool {
        matches!(self, AgentType::PluginTest)
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments passed to the agent on attach, e.g. `AGENT_TYPE=PLUGIN_TEST,k=v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentArgs {
    values: BTreeMap<String, String>,
}

impl AgentArgs {
    /// Parse comma-separated `key=value` pairs. Blank segments are skipped
    /// and a segment without `=` maps its key to the empty string.
    pub fn parse(raw: &str) -> Self {
        let values = raw
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| {
                let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Boot variant selected by [`AGENT_TYPE`].
    pub fn agent_type(&self) -> AgentType {
        self.get(AGENT_TYPE).map(AgentType::parse).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AgentArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Handle to the process the profiler observes.
pub trait Instrumentation: fmt::Debug + Send + Sync {
    /// Process id of the instrumented application.
    fn target_pid(&self) -> u32;
}

/// Instrumentation of an already running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostProcess {
    pub pid: u32,
}

impl HostProcess {
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

impl Instrumentation for HostProcess {
    fn target_pid(&self) -> u32 {
        self.pid
    }
}

/// Everything the booted agent needs to run.
#[derive(Debug, Clone)]
pub struct AgentOption {
    pub instrumentation: Arc<dyn Instrumentation>,
    pub agent_id: String,
    pub application_name: String,
    pub is_container: bool,
    pub profiler_config: Arc<dyn ProfilerConfig>,
    pub plugin_jars: Vec<PathBuf>,
    pub boot_jars: Vec<PathBuf>,
    /// Property bag as it stood when the agent was booted.
    pub properties: BTreeMap<String, String>,
}
