//! Product identity and well-known property keys.
//!
//! Every property the bootstrap reads from or writes to the [`PropertyBag`]
//! is named here so the surface stays in one place.
//!
//! [`PropertyBag`]: crate::properties::PropertyBag

/// Lowercase product name used as the property-key prefix.
pub const NAME: &str = "pinpoint";

/// Capitalised product name used for thread names and log messages.
pub const DISPLAY_NAME: &str = "Pinpoint";

/// Version reported under [`VERSION_KEY`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the agent configuration file.
pub const CONFIG_FILE_NAME: &str = "pinpoint.config";

/// Explicit application name supplied by the operator.
pub const APPLICATION_NAME_KEY: &str = "pinpoint.applicationName";

/// Explicit agent id supplied by the operator.
pub const AGENT_ID_KEY: &str = "pinpoint.agentId";

/// Config file path override.
pub const CONFIG_KEY: &str = "pinpoint.config";

/// Truthy value selects the packaged config and skips the filesystem search.
pub const IS_LOCAL_KEY: &str = "isLocal";

/// Working directory of the host process.
pub const USER_DIR_KEY: &str = "user.dir";

/// Agent log path, written during bootstrap.
pub const LOG_KEY: &str = "pinpoint.log";

/// Agent version, written during bootstrap.
pub const VERSION_KEY: &str = "pinpoint.version";

/// Container detection override.
pub const CONTAINER_KEY: &str = "pinpoint.container";
