use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable prefix for setting overrides.
pub const ENV_PREFIX: &str = "COURIER";

#[courier_derive::courier_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads layered settings: an optional file, then `COURIER__`-prefixed environment overrides.
///
/// 1. **File**: `path` without extension picks any supported format (`host.toml`,
///    `host.yaml`, ...). Defaults to `host` in the working directory. A missing file is not
///    an error; every field falls back to its default.
/// 2. **Environment**: nested keys use double underscores, e.g.
///    `COURIER__LOGGING__LEVEL=debug` maps to `logging.level`. Booleans and numbers are
///    parsed; `COURIER__SCAN_PRECEDENCE` takes a comma-separated list.
///
/// # Errors
/// Returns [`ConfigError::Config`] if a source is malformed or does not match `T`.
///
/// # Example
/// ```rust
/// use courier_kernel::config::load_config;
/// use courier_kernel::domain::HostSettings;
///
/// let settings: HostSettings = load_config(Some("does/not/exist")).unwrap();
/// assert_eq!(settings.xml_namespace, "http://tempuri.net");
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .convert_case(config::Case::Snake)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("scan_precedence")
}

fn load_layered<T>(path: Option<impl AsRef<Path>>, environment: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("host"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(environment);

    info!("Loading settings from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build settings")?
        .try_deserialize::<T>()
        .context("Failed to deserialize settings")?;

    Ok(config)
}
