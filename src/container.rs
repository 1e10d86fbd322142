//! Container detection.

use crate::product;
use crate::properties::PropertyBag;
use std::path::{Path, PathBuf};

/// Decides whether the host process runs inside a container.
pub trait ContainerResolver {
    fn is_container(&self, properties: &dyn PropertyBag) -> bool;
}

/// Marker files written by common container runtimes.
pub const CONTAINER_MARKERS: &[&str] = &["/.dockerenv", "/run/.containerenv"];

/// Set inside every Kubernetes pod.
pub const KUBERNETES_ENV: &str = "KUBERNETES_SERVICE_HOST";

/// Property override first, then runtime marker files and environment.
#[derive(Debug, Clone)]
pub struct DefaultContainerResolver {
    markers: Vec<PathBuf>,
    check_environment: bool,
}

impl Default for DefaultContainerResolver {
    fn default() -> Self {
        Self {
            markers: CONTAINER_MARKERS.iter().map(PathBuf::from).collect(),
            check_environment: true,
        }
    }
}

impl DefaultContainerResolver {
    /// Resolver consulting only the given marker files.
    pub fn with_markers<I, P>(markers: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            markers: markers.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
            check_environment: false,
        }
    }
}

impl ContainerResolver for DefaultContainerResolver {
    fn is_container(&self, properties: &dyn PropertyBag) -> bool {
        // An empty value counts as "set", matching `-Dpinpoint.container`.
        if let Some(value) = properties.get(product::CONTAINER_KEY) {
            let value = value.trim();
            let container = value.is_empty() || value.eq_ignore_ascii_case("true");
            tracing::info!(value, container, "{} property found", product::CONTAINER_KEY);
            return container;
        }

        if self.markers.iter().any(|marker| marker.exists()) {
            return true;
        }
        self.check_environment && std::env::var_os(KUBERNETES_ENV).is_some()
    }
}
