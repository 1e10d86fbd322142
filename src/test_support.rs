use crate::agent::{Agent, AgentOption};
use crate::agent_dir::AgentDirectory;
use crate::container::ContainerResolver;
use crate::loader::{AgentLoader, AgentNamespace, ModuleBridge, NamespaceSpec};
use crate::properties::PropertyBag;
use crate::shutdown::{ShutdownHook, ShutdownRegistry};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Agent home laid out on disk. The directory lives as long as `temp`.
pub(crate) struct AgentHome {
    pub(crate) temp: TempDir,
    pub(crate) dir: AgentDirectory,
}

impl AgentHome {
    pub(crate) fn root(&self) -> &Path {
        self.temp.path()
    }
}

pub(crate) const PROFILER_LIB: &str = "pinpoint-profiler-2.5.jar";
pub(crate) const PROFILER_TEST_LIB: &str = "pinpoint-profiler-test-2.5.jar";

/// Create `<tmp>/agent/` with libs, a plugin, a boot jar and, when given, a
/// packaged `pinpoint.config`.
pub(crate) fn create_agent_home(config: Option<&str>) -> AgentHome {
    create_agent_home_with_libs(config, &[PROFILER_LIB, PROFILER_TEST_LIB])
}

pub(crate) fn create_agent_home_with_libs(config: Option<&str>, libs: &[&str]) -> AgentHome {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("agent");

    write(&home.join("pinpoint-bootstrap"), "");
    for lib in libs {
        write(&home.join("lib").join(lib), "");
    }
    write(&home.join("plugin").join("http-plugin.jar"), "");
    write(&home.join("boot").join("pinpoint-bootstrap-core.jar"), "");
    if let Some(config) = config {
        write(&home.join("pinpoint.config"), config);
    }

    let dir = AgentDirectory::resolve(home.join("pinpoint-bootstrap")).unwrap();
    AgentHome { temp, dir }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Shared log of everything the fakes observed.
#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) events: Mutex<Vec<String>>,
    pub(crate) specs: Mutex<Vec<NamespaceSpec>>,
    pub(crate) boots: Mutex<Vec<(String, AgentOption)>>,
    pub(crate) hooks: Mutex<Vec<ShutdownHook>>,
}

impl Recorder {
    pub(crate) fn push(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder").finish_non_exhaustive()
    }
}

/// Step at which a fake collaborator fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailAt {
    Namespace,
    Boot,
    Start,
}

pub(crate) struct FakeLoader {
    pub(crate) recorder: Arc<Recorder>,
    pub(crate) fail_at: Option<FailAt>,
}

impl AgentLoader for FakeLoader {
    fn create_namespace(&self, spec: NamespaceSpec) -> anyhow::Result<Box<dyn AgentNamespace>> {
        self.recorder.push("namespace");
        if self.fail_at == Some(FailAt::Namespace) {
            anyhow::bail!("namespace refused");
        }
        self.recorder.specs.lock().unwrap().push(spec.clone());
        Ok(Box::new(FakeNamespace {
            spec,
            recorder: Arc::clone(&self.recorder),
            fail_at: self.fail_at,
        }))
    }
}

#[derive(Debug)]
struct FakeNamespace {
    spec: NamespaceSpec,
    recorder: Arc<Recorder>,
    fail_at: Option<FailAt>,
}

impl AgentNamespace for FakeNamespace {
    fn spec(&self) -> &NamespaceSpec {
        &self.spec
    }

    fn boot(&self, boot_class: &str, option: AgentOption) -> anyhow::Result<Arc<dyn Agent>> {
        self.recorder.push("boot");
        if self.fail_at == Some(FailAt::Boot) {
            anyhow::bail!("class {} not found", boot_class);
        }
        self.recorder
            .boots
            .lock()
            .unwrap()
            .push((boot_class.to_string(), option));
        Ok(Arc::new(FakeAgent {
            recorder: Arc::clone(&self.recorder),
            fail_start: self.fail_at == Some(FailAt::Start),
        }))
    }
}

struct FakeAgent {
    recorder: Arc<Recorder>,
    fail_start: bool,
}

impl Agent for FakeAgent {
    fn start(&self) -> anyhow::Result<()> {
        self.recorder.push("start");
        if self.fail_start {
            anyhow::bail!("profiler refused to start");
        }
        Ok(())
    }

    fn stop(&self) {
        self.recorder.push("stop");
    }
}

pub(crate) struct FakeBridge {
    pub(crate) recorder: Arc<Recorder>,
    pub(crate) fail: bool,
}

impl ModuleBridge for FakeBridge {
    fn define_agent_module(&self, namespace: &dyn AgentNamespace) -> anyhow::Result<()> {
        self.recorder.push(&format!("module:{}", namespace.spec().name));
        if self.fail {
            anyhow::bail!("module system unavailable");
        }
        Ok(())
    }
}

pub(crate) struct RecordingShutdown {
    pub(crate) recorder: Arc<Recorder>,
}

impl ShutdownRegistry for RecordingShutdown {
    fn register(&self, hook: ShutdownHook) {
        self.recorder.hooks.lock().unwrap().push(hook);
    }
}

pub(crate) struct FixedContainer(pub(crate) bool);

impl ContainerResolver for FixedContainer {
    fn is_container(&self, _properties: &dyn PropertyBag) -> bool {
        self.0
    }
}
