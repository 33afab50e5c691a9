// fidelis-core/src/infrastructure/config/project.rs

use serde::{Deserialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::dimension::DimensionDefinition;
use crate::domain::project::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

// --- LOADER ---

/// Loads `fidelis.yaml` from `project_dir`, merges satellite files and
/// applies `FIDELIS_*` environment overrides.
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    load_project_config_with(project_dir, |key| std::env::var(key).ok())
}

/// Same as [`load_project_config`] with an explicit environment lookup.
#[instrument(skip(project_dir, env))]
pub fn load_project_config_with(
    project_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Main file discovery
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project manifest");

    // 2. Base YAML
    let mut config: ProjectConfig = load_fragment(&config_path)?;

    // 3. Satellites (fail-secure: a corrupt fragment aborts the load)
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        }
    }

    // 4. Environment layering, e.g. FIDELIS_TARGET_PATH=/tmp/out fidelis run
    apply_env_overrides(&mut config, env)?;

    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(format!("Invalid project file: {}", e)))?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["fidelis_project.yaml", "fidelis.yaml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

/// Typed configuration fragment read from one YAML file.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path).map_err(|e| {
        InfrastructureError::ConfigError(format!("Failed to read {:?}: {}", path, e))
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        InfrastructureError::ConfigError(format!("Failed to parse {:?}: {}", path, e))
    })
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    let dim_path = config_dir.join("dimensions.yml");
    if dim_path.exists() {
        #[derive(Deserialize)]
        struct DimensionsWrapper {
            #[serde(default)]
            dimensions: Vec<DimensionDefinition>,
        }

        let wrapper: DimensionsWrapper = load_fragment(&dim_path)?;
        info!(count = wrapper.dimensions.len(), "  📐 Dimension definitions loaded");
        config.dimensions.extend(wrapper.dimensions);
    }
    Ok(())
}

fn apply_env_overrides(
    config: &mut ProjectConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), InfrastructureError> {
    if let Some(val) = env("FIDELIS_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Some(val) = env("FIDELIS_DATABASE") {
        info!(old = ?config.database, new = ?val, "Overriding database via ENV");
        config.database = val;
    }
    if let Some(val) = env("FIDELIS_REFERENCE_TIMEOUT_SECS") {
        let secs = val.trim().parse::<u64>().map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "FIDELIS_REFERENCE_TIMEOUT_SECS must be a number of seconds, got '{}'",
                val
            ))
        })?;
        if secs == 0 {
            warn!("FIDELIS_REFERENCE_TIMEOUT_SECS=0 will be rejected by validation");
        }
        config.reference.timeout_secs = secs;
    }
    Ok(())
}
