//! Bootstrap orchestration.
//!
//! [`Starter::start`] runs the full sequence: container detection, config
//! discovery and parsing, identity resolution, namespace creation, agent boot
//! and shutdown-hook registration. Every failure is logged and turned into a
//! `false` return so the host application is never destabilized.

use crate::agent::{Agent, AgentArgs, AgentOption, AgentType, Instrumentation};
use crate::agent_dir::AgentDirectory;
use crate::config::{ConfigLoader, ConfigLocator, PropertiesConfigLoader};
use crate::container::{ContainerResolver, DefaultContainerResolver};
use crate::error::{BootstrapError, Result};
use crate::host::{HostProbe, SystemHostProbe};
use crate::id_resolver::IdResolver;
use crate::loader::{self, AgentLoader, ModuleBridge, NamespaceSpec};
use crate::product;
use crate::properties::{PropertyBag, SystemProperties};
use crate::shutdown::{ProcessShutdownHooks, ShutdownHook, ShutdownRegistry};
use std::sync::Arc;
use tracing::{Level, debug, info, warn};

/// Name of the thread running the agent's `stop` on process exit.
pub fn shutdown_hook_name() -> String {
    format!("{}-shutdown-hook", product::DISPLAY_NAME)
}

/// Drives the agent bootstrap.
///
/// Collaborators default to the process-wide implementations and can be
/// replaced with the `with_*` builders.
pub struct Starter {
    agent_args: AgentArgs,
    agent_dir: AgentDirectory,
    instrumentation: Arc<dyn Instrumentation>,
    parent_namespace: Option<String>,
    loader: Box<dyn AgentLoader>,
    module_bridge: Option<Box<dyn ModuleBridge>>,
    properties: Box<dyn PropertyBag>,
    host: Box<dyn HostProbe>,
    container: Box<dyn ContainerResolver>,
    config_loader: Box<dyn ConfigLoader>,
    shutdown: Box<dyn ShutdownRegistry>,
}

impl Starter {
    pub fn new(
        agent_args: AgentArgs,
        agent_dir: AgentDirectory,
        instrumentation: Arc<dyn Instrumentation>,
        loader: Box<dyn AgentLoader>,
    ) -> Self {
        Self {
            agent_args,
            agent_dir,
            instrumentation,
            parent_namespace: None,
            loader,
            module_bridge: None,
            properties: Box::new(SystemProperties),
            host: Box::new(SystemHostProbe),
            container: Box::new(DefaultContainerResolver::default()),
            config_loader: Box::new(PropertiesConfigLoader),
            shutdown: Box::new(ProcessShutdownHooks),
        }
    }

    pub fn with_parent_namespace(mut self, parent: impl Into<String>) -> Self {
        self.parent_namespace = Some(parent.into());
        self
    }

    pub fn with_module_bridge(mut self, bridge: Box<dyn ModuleBridge>) -> Self {
        self.module_bridge = Some(bridge);
        self
    }

    pub fn with_properties(mut self, properties: Box<dyn PropertyBag>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_host_probe(mut self, host: Box<dyn HostProbe>) -> Self {
        self.host = host;
        self
    }

    pub fn with_container_resolver(mut self, container: Box<dyn ContainerResolver>) -> Self {
        self.container = container;
        self
    }

    pub fn with_config_loader(mut self, config_loader: Box<dyn ConfigLoader>) -> Self {
        self.config_loader = config_loader;
        self
    }

    pub fn with_shutdown_registry(mut self, shutdown: Box<dyn ShutdownRegistry>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Property bag the bootstrap reads and writes.
    pub fn properties(&self) -> &dyn PropertyBag {
        self.properties.as_ref()
    }

    /// Boot variant selected by the agent arguments.
    pub fn agent_type(&self) -> AgentType {
        self.agent_args.agent_type()
    }

    /// Run the bootstrap. Returns `true` once the agent is started and its
    /// shutdown hook registered; `false` if bootstrap was abandoned.
    ///
    /// Property writes made before a failure are kept.
    pub fn start(&mut self) -> bool {
        match self.try_start() {
            Ok(_) => {
                info!("{} agent started normally", product::DISPLAY_NAME);
                true
            }
            Err(e) => {
                log_failure(&e);
                false
            }
        }
    }

    /// Run the bootstrap, returning the started agent or the reason it was
    /// abandoned.
    pub fn try_start(&mut self) -> Result<Arc<dyn Agent>> {
        let is_container = self.container.is_container(self.properties.as_ref());
        debug!(is_container, "container detection finished");

        let config_path =
            ConfigLocator::new(self.properties.as_ref(), &self.agent_dir.agent_config_path)
                .locate()
                .ok_or(BootstrapError::MissingConfig)?;

        self.save_log_file_path();
        self.save_version();

        let profiler_config = self.config_loader.load(&config_path)?;

        let (application_name, agent_id) = {
            let mut resolver = IdResolver::new(self.properties.as_mut(), self.host.as_ref());
            let application_name = resolver
                .application_name(profiler_config.as_ref())
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    BootstrapError::MissingProperty(product::APPLICATION_NAME_KEY.to_string())
                })?;
            let agent_id = resolver.agent_id(&application_name).ok_or_else(|| {
                BootstrapError::MissingProperty(product::AGENT_ID_KEY.to_string())
            })?;
            (application_name, agent_id)
        };

        let agent_type = self.agent_type();
        self.agent_dir.log_layout();
        let libs = loader::select_libs(&self.agent_dir.libs, agent_type)?;

        let spec = NamespaceSpec::agent(libs, self.parent_namespace.clone());
        let namespace = self
            .loader
            .create_namespace(spec)
            .map_err(|e| BootstrapError::unexpected("failed to create agent namespace", e))?;

        if let Some(bridge) = &self.module_bridge {
            info!("defineAgentModule");
            bridge
                .define_agent_module(namespace.as_ref())
                .map_err(|e| BootstrapError::unexpected("failed to define agent module", e))?;
        }

        let boot_class = agent_type.boot_class();
        info!("{} agent [{}] starting...", product::DISPLAY_NAME, boot_class);
        let option = AgentOption {
            instrumentation: Arc::clone(&self.instrumentation),
            agent_id,
            application_name,
            is_container,
            profiler_config,
            plugin_jars: self.agent_dir.plugins.clone(),
            boot_jars: self.agent_dir.boot_jars.clone(),
            properties: self.properties.entries(),
        };
        let agent = namespace
            .boot(boot_class, option)
            .map_err(|e| BootstrapError::unexpected(format!("failed to boot {}", boot_class), e))?;
        agent
            .start()
            .map_err(|e| BootstrapError::unexpected("agent start failed", e))?;

        self.register_shutdown_hook(Arc::clone(&agent));
        Ok(agent)
    }

    fn register_shutdown_hook(&self, agent: Arc<dyn Agent>) {
        let hook = ShutdownHook::new(shutdown_hook_name(), false, move || agent.stop());
        self.shutdown.register(hook);
    }

    fn save_log_file_path(&mut self) {
        let log_path = self.agent_dir.agent_log_file_path.to_string_lossy().to_string();
        info!("logPath:{}", log_path);
        self.properties.set(product::LOG_KEY, &log_path);
    }

    fn save_version(&mut self) {
        info!("{} version:{}", product::NAME, product::VERSION);
        self.properties.set(product::VERSION_KEY, product::VERSION);
    }
}

fn log_failure(e: &BootstrapError) {
    let level = e.level();
    if level == Level::INFO {
        info!("{} start skipped: {}", product::NAME, e);
    } else if level == Level::DEBUG {
        debug!("{} start failed: {}", product::NAME, e);
    } else {
        warn!("{} start failed: {}", product::NAME, e);
    }
}
