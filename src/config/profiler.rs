//! Parsed profiler configuration.

use crate::error::{BootstrapError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key holding the default application name.
pub const APPLICATION_NAME_CONFIG_KEY: &str = "profiler.application.name";

/// Read-only view of the agent configuration.
pub trait ProfilerConfig: fmt::Debug + Send + Sync {
    /// Application name used when none is supplied as a property.
    fn application_name(&self) -> Option<String>;

    /// Raw value of any configuration key.
    fn property(&self, key: &str) -> Option<String>;

    /// File the configuration was loaded from, if any.
    fn path(&self) -> Option<&Path>;
}

/// Turns a config path into a [`ProfilerConfig`].
pub trait ConfigLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn ProfilerConfig>>;
}

/// Loads [`DefaultProfilerConfig`] from properties-format files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesConfigLoader;

impl ConfigLoader for PropertiesConfigLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn ProfilerConfig>> {
        Ok(Arc::new(DefaultProfilerConfig::load(path)?))
    }
}

/// Configuration backed by a flat `key=value` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultProfilerConfig {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl DefaultProfilerConfig {
    /// Load config from a properties file.
    ///
    /// # Returns
    ///
    /// * `Ok(DefaultProfilerConfig)` - Successfully parsed config
    /// * `Err(BootstrapError::Io)` - The file could not be read
    /// * `Err(BootstrapError::ConfigParse)` - A line has no key
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| BootstrapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config = Self::parse(&content).map_err(|(line, message)| {
            BootstrapError::ConfigParse {
                path: path.to_path_buf(),
                line,
                message,
            }
        })?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config from properties text.
    ///
    /// Lines starting with `#` or `!` are comments. Keys and values are split
    /// on the first `=` or `:` and trimmed; a line holding only a key maps it
    /// to the empty string. Later duplicates win.
    pub fn from_properties(text: &str) -> Result<Self> {
        Self::parse(text).map_err(|(line, message)| BootstrapError::ConfigParse {
            path: PathBuf::new(),
            line,
            message,
        })
    }

    fn parse(text: &str) -> std::result::Result<Self, (usize, String)> {
        let mut values = BTreeMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let (key, value) = match line.find(['=', ':']) {
                Some(pos) => (line[..pos].trim(), line[pos + 1..].trim()),
                None => (line, ""),
            };
            if key.is_empty() {
                return Err((index + 1, format!("missing key before separator in '{}'", line)));
            }
            values.insert(key.to_string(), value.to_string());
        }

        Ok(Self { path: None, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ProfilerConfig for DefaultProfilerConfig {
    fn application_name(&self) -> Option<String> {
        self.values
            .get(APPLICATION_NAME_CONFIG_KEY)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn property(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
