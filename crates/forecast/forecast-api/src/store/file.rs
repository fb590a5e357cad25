//! Snapshots on the local filesystem

use super::snapshot::{decode_snapshot, encode_snapshot};
use forecast_spi::{ForecastError, ModelState, Result, StateStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each model as `<root>/lstm/<name>`, a JSON string holding the
/// encoded snapshot
#[derive(Debug, Clone)]
pub struct FileStateStore {
    root: PathBuf,
}

impl FileStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the snapshot for `name`
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !plain {
            return Err(ForecastError::InvalidParameter {
                name: "model_name".to_string(),
                reason: format!("'{}' is not a plain file name", name),
            });
        }
        Ok(self.root.join("lstm").join(name))
    }
}

impl StateStore for FileStateStore {
    fn load(&self, name: &str) -> Result<ModelState> {
        let path = self.path_for(name)?;
        let text = fs::read_to_string(&path)
            .map_err(|e| ForecastError::Persistence(format!("{}: {}", path.display(), e)))?;
        let encoded: String = serde_json::from_str(&text)
            .map_err(|e| ForecastError::Persistence(format!("{}: {}", path.display(), e)))?;
        let state = decode_snapshot(&encoded)?;
        debug!(path = %path.display(), "state loaded");
        Ok(state)
    }

    fn save(&self, state: &ModelState) -> Result<()> {
        let path = self.path_for(&state.name)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| ForecastError::Persistence(format!("{}: {}", dir.display(), e)))?;
        }
        let text = serde_json::to_string(&encode_snapshot(state)?)
            .map_err(|e| ForecastError::Persistence(e.to_string()))?;
        fs::write(&path, text.as_bytes())
            .map_err(|e| ForecastError::Persistence(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = text.len(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_spi::HyperParameters;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        let mut state = ModelState::new("meter", HyperParameters::default());
        state.progress.round_count = 2;
        store.save(&state).unwrap();

        assert!(dir.path().join("lstm").join("meter").exists());
        assert_eq!(store.load("meter").unwrap(), state);
    }

    #[test]
    fn test_file_is_a_json_string() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        store
            .save(&ModelState::new("m", HyperParameters::default()))
            .unwrap();
        let text = fs::read_to_string(dir.path().join("lstm/m")).unwrap();
        assert!(text.starts_with('"') && text.ends_with('"'));
    }

    #[test]
    fn test_missing_and_corrupt_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        assert!(matches!(store.load("absent"), Err(ForecastError::Persistence(_))));

        fs::create_dir_all(dir.path().join("lstm")).unwrap();
        fs::write(dir.path().join("lstm/broken"), "\"AAAA\"").unwrap();
        let state = store.load_or_default("broken", HyperParameters::default());
        assert_eq!(state.name, "broken");
        assert!(state.trend.is_empty());
    }

    #[test]
    fn test_rejects_path_names() {
        let store = FileStateStore::new("/tmp");
        assert!(store.path_for("../escape").is_err());
        assert!(store.path_for("").is_err());
        assert!(store.path_for("site-1").is_ok());
    }
}
