use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Kinds of text artifact written under the application directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Command,
    Response,
}

impl ArtifactKind {
    fn subdirectory(self) -> &'static str {
        match self {
            ArtifactKind::Command => "curl-commands",
            ArtifactKind::Response => "responses",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Command => "curl",
            ArtifactKind::Response => "response",
        }
    }
}

/// Writes `<prefix>_<YYYYMMDD_HHMMSS>.txt` files.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn save(&self, kind: ArtifactKind, content: &str) -> Result<PathBuf> {
        let dir = self.root.join(kind.subdirectory());
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("{}_{}.txt", kind.prefix(), timestamp));
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

        info!(path = %path.display(), "artifact saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn is_timestamped(name: &str, prefix: &str) -> bool {
        let Some(stamp) = name
            .strip_prefix(&format!("{}_", prefix))
            .and_then(|rest| rest.strip_suffix(".txt"))
        else {
            return false;
        };
        let (date, time) = stamp.split_at(8);
        date.chars().all(|c| c.is_ascii_digit())
            && time.len() == 7
            && time.starts_with('_')
            && time[1..].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn writes_command_under_its_directory() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.save(ArtifactKind::Command, "curl \"http://h\"").unwrap();

        assert_eq!(path.parent().unwrap(), dir.path().join("curl-commands"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(is_timestamped(&name, "curl"), "unexpected name {}", name);
        assert_eq!(fs::read_to_string(&path).unwrap(), "curl \"http://h\"");
    }

    #[test]
    fn writes_response_under_its_directory() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.save(ArtifactKind::Response, "Status: 200 OK").unwrap();

        assert_eq!(path.parent().unwrap(), dir.path().join("responses"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(is_timestamped(&name, "response"), "unexpected name {}", name);
    }
}
