use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Resolve `<crate>/config`, whether run from the workspace root or the crate.
pub fn configuration_directory(crate_dir: &str) -> PathBuf {
    let base_path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if base_path.ends_with(crate_dir) {
        base_path.join("config")
    } else {
        base_path.join(crate_dir).join("config")
    }
}

/// Layered settings: `config/base.yaml` when present, then `<PREFIX>__*`
/// environment variables (`__` separates nested keys).
pub fn load_layered<T>(crate_dir: &str, env_prefix: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let directory = configuration_directory(crate_dir);

    Config::builder()
        .add_source(File::from(directory.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
