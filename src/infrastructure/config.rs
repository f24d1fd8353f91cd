use crate::domain::settings::Settings;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Overrides the application directory (`~/.reqsmith` by default).
pub const ENV_REQSMITH_HOME: &str = "REQSMITH_HOME";

const CONFIG_FILE_NAME: &str = "config.json";

/// Resolves the per-user application directory.
pub fn app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_REQSMITH_HOME) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".reqsmith"))
        .ok_or_else(|| anyhow!("Could not determine the home directory"))
}

/// Persistence boundary for `Settings`: loaded once, saved whole.
pub trait ConfigStore {
    /// Returns defaults when nothing usable is stored.
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<()>;
    fn reset(&self) -> Result<()>;
    fn location(&self) -> &Path;
}

/// Settings stored as a pretty-printed JSON file.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_FILE_NAME))
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Settings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(
                    path = %self.path.display(),
                    error = %err,
                    "no stored settings, using defaults"
                );
                return Settings::default();
            }
        };
        if raw.trim().is_empty() {
            return Settings::default();
        }
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(
                path = %self.path.display(),
                error = %err,
                "stored settings unreadable, using defaults"
            );
            Settings::default()
        })
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        atomic_write(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to delete {}", self.path.display()))
            }
        }
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Writes to a temp sibling, then renames it over `path`.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map_or_else(|| "config".to_string(), |n| n.to_string_lossy().to_string());
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    fs::write(&temp_path, data)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::AuthType;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        fs::write(store.location(), "{ not json").unwrap();
        assert_eq!(store.load(), Settings::default());
        fs::write(store.location(), "   ").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("nested").join("config.json"));

        let mut settings = Settings {
            base_url: Some("https://api.example.com".into()),
            auth_type: AuthType::JwtBearer,
            auth_token: Some("jwt".into()),
            max_time_seconds: Some(20),
            ..Settings::default()
        };
        settings.add_recent_path("/v1/items");
        settings.query_parameters.insert("limit".into(), "10".into());

        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);

        let leftovers: Vec<_> = fs::read_dir(store.location().parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn reset_removes_file_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        store.save(&Settings::default()).unwrap();
        assert!(store.location().exists());
        store.reset().unwrap();
        assert!(!store.location().exists());
        store.reset().unwrap();
    }
}
