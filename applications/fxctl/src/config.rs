/// Factory configuration loading
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use tonebridge_effects::{FactoryConfig, PolicyPreset};

/// Read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "tonebridge.toml";

/// Environment overrides, e.g. `TONEBRIDGE__CONTEXT__LONG_FADE_MS=3000`
pub const ENV_PREFIX: &str = "TONEBRIDGE";

/// Load configuration from file and environment.
///
/// An explicit `path` must exist; the default file is optional.
pub fn load(path: Option<&Path>) -> Result<FactoryConfig> {
    let mut settings = config::Config::builder();

    match path {
        Some(path) => {
            settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                settings = settings.add_source(config::File::from(default_path));
            }
        }
    }

    // Override with environment variables (prefixed with TONEBRIDGE__)
    settings = settings.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let config = settings
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let factory: FactoryConfig = config
        .try_deserialize()
        .map_err(|e| CliError::Config(e.to_string()))?;
    factory
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(factory)
}

/// Switch `config` to `preset`, enabling whatever the pipeline must host.
pub fn apply_policy(config: &mut FactoryConfig, preset: PolicyPreset) {
    config.policy = preset;
    if preset == PolicyPreset::PipelineOnly {
        let required = FactoryConfig::pipeline_only().context.effects;
        config.context.effects.extend(required);
    }
}
