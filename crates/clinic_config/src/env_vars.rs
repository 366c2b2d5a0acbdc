//! Environment variable naming for configuration overrides.
//!
//! Any configuration key can be overridden from the environment by upper-casing
//! its path, joining segments with `__` and prefixing it with the configured
//! prefix, e.g. `booking.enforce_capacity` becomes
//! `CLINIC__BOOKING__ENFORCE_CAPACITY`.

use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "CLINIC";

/// The separator between prefix and path segments
pub const CONFIG_SEPARATOR: &str = "__";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path (e.g. "server.port") to the environment
/// variable that overrides it (e.g. "CLINIC__SERVER__PORT").
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}
