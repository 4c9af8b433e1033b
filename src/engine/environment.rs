use crate::error::{ProcessingError, Result};
use crate::utils::constants::{ENGINE_HOME_ENV, ENGINE_HOME_KEY, ENV_PREFIX};
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EngineSettings {
    engine_home: Option<String>,
}

/// Verified location of the engine's working root. Sessions put their
/// scratch space underneath it.
#[derive(Debug, Clone)]
pub struct EngineEnvironment {
    home: PathBuf,
}

impl EngineEnvironment {
    /// Resolve the engine home from the process environment.
    ///
    /// Order: `explicit` override, then `TRIP_ENGINE_HOME`, then error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_from(explicit, None)
    }

    /// Same as [`EngineEnvironment::resolve`] but reads variables from
    /// `env_source` instead of the process environment when given.
    pub fn resolve_from(
        explicit: Option<&Path>,
        env_source: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let settings: EngineSettings = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env_source))
            .set_override_option(
                ENGINE_HOME_KEY,
                explicit.map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()?
            .try_deserialize()?;

        let home = settings
            .engine_home
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ProcessingError::EnvironmentUnset {
                variable: ENGINE_HOME_ENV.to_string(),
            })?;

        Self::verify(home)
    }

    fn verify(home: PathBuf) -> Result<Self> {
        if !home.exists() {
            return Err(ProcessingError::Environment {
                path: home,
                reason: "does not exist; check the engine installation and TRIP_ENGINE_HOME"
                    .to_string(),
            });
        }

        if !home.is_dir() {
            return Err(ProcessingError::Environment {
                path: home,
                reason: "is not a directory".to_string(),
            });
        }

        debug!(home = %home.display(), "engine home verified");
        Ok(Self { home })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}
