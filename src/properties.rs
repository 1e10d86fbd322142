//! String property storage shared by the bootstrap components.
//!
//! [`SystemProperties`] is a handle to the process-wide store that the agent
//! reads at class-load time; [`MemoryProperties`] is a private map used when
//! the bootstrap must not touch process state (tests, embedding).

use std::collections::BTreeMap;
use std::sync::{LazyLock, RwLock};

use crate::product;

/// Mutable string-to-string mapping with case-sensitive keys.
pub trait PropertyBag {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Snapshot of every stored entry, sorted by key.
    fn entries(&self) -> BTreeMap<String, String>;

    /// Value under `key` with surrounding whitespace removed, `None` when
    /// absent or blank.
    fn get_trimmed(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

static SYSTEM_PROPERTIES: LazyLock<RwLock<BTreeMap<String, String>>> =
    LazyLock::new(|| RwLock::new(initial_system_properties()));

fn initial_system_properties() -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if let Ok(cwd) = std::env::current_dir() {
        map.insert(
            product::USER_DIR_KEY.to_string(),
            cwd.to_string_lossy().to_string(),
        );
    }
    map
}

/// Handle to the process-wide property store.
///
/// The store is seeded with `user.dir` on first use. All handles observe the
/// same values.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProperties;

impl SystemProperties {
    /// Apply `key=value` definitions such as those given with `-D`.
    ///
    /// A definition without `=` stores an empty value, which still counts as
    /// "set" for [`crate::product::CONFIG_KEY`] lookups.
    pub fn define_all<I, S>(&mut self, definitions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for definition in definitions {
            let (key, value) = split_definition(definition.as_ref());
            if !key.is_empty() {
                self.set(key, value);
            }
        }
    }
}

impl PropertyBag for SystemProperties {
    fn get(&self, key: &str) -> Option<String> {
        let map = SYSTEM_PROPERTIES
            .read()
            .unwrap_or_else(|poison| poison.into_inner());
        map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        let mut map = SYSTEM_PROPERTIES
            .write()
            .unwrap_or_else(|poison| poison.into_inner());
        map.insert(key.to_string(), value.to_string());
    }

    fn entries(&self) -> BTreeMap<String, String> {
        SYSTEM_PROPERTIES
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

/// Private in-memory property map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryProperties {
    values: BTreeMap<String, String>,
}

impl MemoryProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertyBag for MemoryProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn entries(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }
}

/// Split `key=value`; the key and value are trimmed.
fn split_definition(definition: &str) -> (&str, &str) {
    match definition.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (definition.trim(), ""),
    }
}
