//! Loading eval configs from YAML/JSON files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use super::EvalConfig;

/// Load a config, choosing the parser from the file extension
pub fn load_config(path: impl AsRef<Path>) -> Result<EvalConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read eval config: {:?}", path))?;

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML eval config: {:?}", path))?,
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON eval config: {:?}", path))?,
        _ => bail!("Unsupported eval config extension: {:?}", path),
    };

    tracing::debug!(path = %path.display(), "loaded eval config");
    Ok(config)
}

/// Loader for every config file under a directory
pub struct ConfigLoader {
    root: PathBuf,
}

impl ConfigLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Loader for the configs shipped with this crate
    pub fn builtin() -> Self {
        let manifest_dir = env!("CARGO_MANIFEST_DIR");
        Self::new(Path::new(manifest_dir).join("configs"))
    }

    /// Config file paths under the root, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        if self.root.is_file() {
            return vec![self.root.clone()];
        }
        if !self.root.exists() {
            return Vec::new();
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| Self::is_config_file(p))
            .collect();
        paths.sort();
        paths
    }

    /// Load every config, skipping (and logging) files that fail to parse
    pub fn load_all(&self) -> Vec<(PathBuf, EvalConfig)> {
        self.paths()
            .into_iter()
            .filter_map(|path| match load_config(&path) {
                Ok(config) => Some((path, config)),
                Err(e) => {
                    tracing::warn!("Failed to load eval config from {:?}: {:#}", path, e);
                    None
                }
            })
            .collect()
    }

    /// Load every config, failing on the first bad file
    pub fn load_all_strict(&self) -> Result<Vec<(PathBuf, EvalConfig)>> {
        self.paths()
            .into_iter()
            .map(|path| load_config(&path).map(|config| (path, config)))
            .collect()
    }

    /// Load a config by file stem (e.g. `"example"` for `example.yaml`)
    pub fn load_by_name(&self, name: &str) -> Result<Option<EvalConfig>> {
        let Some(path) = self
            .paths()
            .into_iter()
            .find(|p| p.file_stem().and_then(|s| s.to_str()) == Some(name))
        else {
            return Ok(None);
        };
        load_config(path).map(Some)
    }

    fn is_config_file(path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }

        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml") | Some("json")
        )
    }
}
