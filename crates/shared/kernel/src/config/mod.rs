use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_PREFIX: &str = "PLATTER";

#[platter_derive::platter_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file overlaid with `PLATTER__` environment variables.
///
/// The file defaults to `server` (any extension the `config` crate knows, e.g.
/// `server.toml`) and must exist. Nested keys use `__`:
/// `PLATTER__DATABASE__URL` sets `database.url`.
///
/// ```rust
/// use platter_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Settings {
///     port: u16,
/// }
///
/// let settings: Settings = load_config(Some("does/not/exist")).unwrap_or_default();
/// assert_eq!(settings.port, 0);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());
    info!(path = %path.display(), "Loading configuration");

    Config::builder()
        .add_source(File::from(path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("building configuration")?
        .try_deserialize::<T>()
        .context("deserializing configuration")
}
