//! Configuration for the clinic booking service.
//!
//! Sources are layered, later ones winning:
//!
//! 1. `config/default.toml`
//! 2. `config/{RUN_ENV}.toml` (RUN_ENV defaults to `debug`)
//! 3. environment variables prefixed `CLINIC__` (see [`env_vars`])
//!
//! The directory can be moved with `CONFIG_DIR`. A `.env` file is loaded once
//! before the environment is read.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Loads the application configuration from the config directory and the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading configuration from {} and {} (overrides via e.g. {})",
        default_path.display(),
        env_path.display(),
        env_vars::config_path_to_env_var("server.port")
    );

    let builder = with_defaults(Config::builder())?
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix(&env_vars::get_config_prefix())
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    builder.build()?.try_deserialize()
}

/// Builds a configuration from an inline TOML document, without consulting
/// files or the environment.
pub fn load_config_from_str(toml: &str) -> Result<AppConfig, ConfigError> {
    with_defaults(Config::builder())?
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let server = ServerConfig::default();
    builder
        .set_default("server.host", server.host)?
        .set_default("server.port", i64::from(server.port))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, at most once.
///
/// The path comes from `DOTENV_OVERRIDE` and falls back to `.env`. A missing
/// file is not an error. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
