use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use glosa_config::Config;
use serde::{Deserialize, Serialize};

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

fn read_profile(path: &Path) -> anyhow::Result<Profile> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let profile = serde_json::from_reader(reader)?;
    Ok(profile)
}

/// Profile path from the command line, then `$GLOSA_PROFILE`.
pub fn profile_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("GLOSA_PROFILE").ok().map(PathBuf::from))
}

/// Where the configuration came from, logged once tracing is up.
#[derive(Debug, PartialEq, Eq)]
pub enum ProfileSource {
    Defaults,
    Missing(PathBuf),
    File { name: String, path: PathBuf },
}

impl ProfileSource {
    pub fn report(&self) {
        match self {
            ProfileSource::Defaults => tracing::debug!("No profile found, using defaults"),
            ProfileSource::Missing(path) => {
                tracing::warn!("Profile {} not found, using defaults", path.display())
            }
            ProfileSource::File { name, path } => {
                tracing::info!("Loaded profile {} from {}", name, path.display())
            }
        }
    }
}

/// Loads the chosen profile, or built-in defaults when there is none.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, ProfileSource)> {
    match profile_path(explicit) {
        Some(path) if !path.exists() => Ok((Config::new(), ProfileSource::Missing(path))),
        Some(path) => {
            let profile = read_profile(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load profile {}: {e}", path.display()))?;
            let source = ProfileSource::File {
                name: profile.name,
                path,
            };
            Ok((profile.value, source))
        }
        None => Ok((Config::new(), ProfileSource::Defaults)),
    }
}

/// Writes `config` as a named profile.
pub fn save_profile(path: &Path, name: &str, config: &Config) -> anyhow::Result<()> {
    let profile = Profile {
        name: name.into(),
        value: config.clone(),
    };
    fs::write(path, serde_json::to_string_pretty(&profile)?)?;
    tracing::info!("Saved profile {name} to {}", path.display());
    Ok(())
}
