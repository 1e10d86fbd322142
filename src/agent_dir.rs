//! Agent installation layout.
//!
//! The bootstrap artifact lives in the agent home next to:
//!
//! ```text
//! <home>/pinpoint.config   packaged configuration
//! <home>/lib/              profiler libraries
//! <home>/plugin/           plugin jars
//! <home>/boot/             jars appended to the boot path
//! <home>/log/              agent logs
//! ```

use crate::error::{BootstrapError, Result};
use crate::product;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

pub const LIB_DIR: &str = "lib";
pub const PLUGIN_DIR: &str = "plugin";
pub const BOOT_DIR: &str = "boot";
pub const LOG_DIR: &str = "log";

/// Resolved paths of an agent installation. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDirectory {
    /// The bootstrap artifact itself.
    pub agent_path: PathBuf,

    /// Directory containing the bootstrap artifact.
    pub agent_home: PathBuf,

    /// Library directory (`<home>/lib`).
    pub agent_lib_path: PathBuf,

    /// Packaged configuration file.
    pub agent_config_path: PathBuf,

    /// Log location exported as `pinpoint.log`.
    pub agent_log_file_path: PathBuf,

    /// Sorted contents of `<home>/plugin`.
    pub plugins: Vec<PathBuf>,

    /// Sorted contents of `<home>/boot`.
    pub boot_jars: Vec<PathBuf>,

    /// Sorted contents of `<home>/lib`.
    pub libs: Vec<PathBuf>,
}

impl AgentDirectory {
    /// Resolve the layout around the bootstrap artifact at `agent_path`.
    ///
    /// Missing `lib`, `plugin` or `boot` directories resolve to empty lists.
    pub fn resolve<P: AsRef<Path>>(agent_path: P) -> Result<Self> {
        let agent_path = agent_path.as_ref();
        let agent_path = std::path::absolute(agent_path).map_err(|e| BootstrapError::Io {
            path: agent_path.to_path_buf(),
            source: e,
        })?;
        let agent_home = agent_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| BootstrapError::Io {
                path: agent_path.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "agent path has no parent"),
            })?;

        let agent_lib_path = agent_home.join(LIB_DIR);
        let dir = Self {
            libs: list_files(&agent_lib_path)?,
            plugins: list_files(&agent_home.join(PLUGIN_DIR))?,
            boot_jars: list_files(&agent_home.join(BOOT_DIR))?,
            agent_config_path: agent_home.join(product::CONFIG_FILE_NAME),
            agent_log_file_path: agent_home.join(LOG_DIR),
            agent_lib_path,
            agent_home,
            agent_path,
        };
        Ok(dir)
    }

    /// Log the resolved layout at info.
    pub fn log_layout(&self) {
        info!(path = %self.agent_path.display(), "agent path");
        info!(path = %self.agent_lib_path.display(), "agent lib dir");
        for lib in &self.libs {
            info!(lib = %lib.display(), "agent lib");
        }
        info!(path = %self.agent_config_path.display(), "agent config");
    }
}

/// Sorted regular files directly inside `dir`; empty when `dir` is missing.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(BootstrapError::Io {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| BootstrapError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn resolve_collects_sorted_layout() {
        let temp = TempDir::new().unwrap();
        let home = temp.path();
        let agent = home.join("pinpoint-bootstrap");
        write(&agent);
        write(&home.join("lib").join("b-core.so"));
        write(&home.join("lib").join("a-common.so"));
        fs::create_dir_all(home.join("lib").join("nested")).unwrap();
        write(&home.join("plugin").join("http-plugin.jar"));
        write(&home.join("boot").join("boot-core.jar"));

        let dir = AgentDirectory::resolve(&agent).unwrap();

        assert_eq!(dir.agent_home, home);
        assert_eq!(dir.agent_lib_path, home.join("lib"));
        assert_eq!(dir.agent_config_path, home.join("pinpoint.config"));
        assert_eq!(dir.agent_log_file_path, home.join("log"));
        assert_eq!(
            dir.libs,
            vec![home.join("lib").join("a-common.so"), home.join("lib").join("b-core.so")]
        );
        assert_eq!(dir.plugins, vec![home.join("plugin").join("http-plugin.jar")]);
        assert_eq!(dir.boot_jars, vec![home.join("boot").join("boot-core.jar")]);
    }

    #[test]
    fn missing_directories_are_empty() {
        let temp = TempDir::new().unwrap();
        let dir = AgentDirectory::resolve(temp.path().join("pinpoint-bootstrap")).unwrap();

        assert!(dir.libs.is_empty());
        assert!(dir.plugins.is_empty());
        assert!(dir.boot_jars.is_empty());
    }
}
