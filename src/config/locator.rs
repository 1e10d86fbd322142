//! Config file discovery.

use crate::product;
use crate::properties::PropertyBag;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Deepest directory level below the search root that is still entered.
pub const MAX_SEARCH_DEPTH: usize = 32;

/// Resolves the path of the agent configuration file.
///
/// Priority:
/// 1. `-Dpinpoint.config`, returned verbatim
/// 2. the packaged config when `-DisLocal` is non-empty
/// 3. a depth-first search under the parent of `user.dir`
pub struct ConfigLocator<'a> {
    properties: &'a dyn PropertyBag,
    packaged_config: &'a Path,
}

impl<'a> ConfigLocator<'a> {
    pub fn new(properties: &'a dyn PropertyBag, packaged_config: &'a Path) -> Self {
        Self {
            properties,
            packaged_config,
        }
    }

    /// Resolve the config path, `None` when no step produced one.
    pub fn locate(&self) -> Option<PathBuf> {
        let config_key = product::CONFIG_KEY;
        if let Some(path) = self.properties.get(config_key) {
            info!(path = %path, "{} property found", config_key);
            return Some(PathBuf::from(path));
        }

        let located = if self.is_local() {
            Some(self.packaged_config.to_path_buf())
        } else {
            self.search_from_user_dir()
        };

        match located {
            Some(path) => {
                info!(path = %path.display(), "{} found", product::CONFIG_FILE_NAME);
                Some(path)
            }
            None => {
                info!("{} file not found", product::CONFIG_FILE_NAME);
                None
            }
        }
    }

    fn is_local(&self) -> bool {
        self.properties
            .get(product::IS_LOCAL_KEY)
            .is_some_and(|v| !v.is_empty())
    }

    fn search_from_user_dir(&self) -> Option<PathBuf> {
        let user_dir = match self.properties.get(product::USER_DIR_KEY) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().ok()?,
        };
        let user_dir = std::path::absolute(&user_dir).unwrap_or(user_dir);
        let root = user_dir.parent()?;
        debug!(root = %root.display(), "searching for {}", product::CONFIG_FILE_NAME);
        search_config(root, product::CONFIG_FILE_NAME)
    }
}

/// Depth-first search for the first regular file called `file_name`.
///
/// Entries are visited in byte-wise name order. Unreadable directories count
/// as empty. A directory is entered at most once per canonical path, so
/// symlink cycles terminate, and nothing deeper than [`MAX_SEARCH_DEPTH`]
/// levels below `root` is entered.
pub fn search_config(root: &Path, file_name: &str) -> Option<PathBuf> {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let mut visited = HashSet::new();
    search_dir(&root, file_name, 0, &mut visited)
}

fn search_dir(
    dir: &Path,
    file_name: &str,
    depth: usize,
    visited: &mut HashSet<PathBuf>,
) -> Option<PathBuf> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    let canonical = fs::canonicalize(dir).ok()?;
    if !visited.insert(canonical) {
        return None;
    }

    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return None;
        }
    };
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    for entry in entries {
        if entry.is_file() {
            if entry.file_name().is_some_and(|n| n == file_name) {
                return Some(entry);
            }
        } else if entry.is_dir()
            && let Some(found) = search_dir(&entry, file_name, depth + 1, visited)
        {
            return Some(found);
        }
    }
    None
}
