//! Agent configuration discovery and loading.
//!
//! [`ConfigLocator`] finds the `pinpoint.config` file through a priority
//! chain of properties, the packaged agent directory, and a filesystem
//! search. [`DefaultProfilerConfig`] parses the file into the read-only view
//! the rest of the bootstrap consumes through [`ProfilerConfig`].

mod locator;
mod profiler;


// Re-export public API
pub use locator::{ConfigLocator, MAX_SEARCH_DEPTH, search_config};
pub use profiler::{
    APPLICATION_NAME_CONFIG_KEY, ConfigLoader, DefaultProfilerConfig, ProfilerConfig,
    PropertiesConfigLoader,
};
