//! Config commands: validate and show eval configs

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use rgym_core::dataset::global;
use rgym_eval::config::{ConfigLoader, ConfigValidator, load_config};

use crate::console::CliConsole;

fn config_paths(path: &Path) -> Vec<PathBuf> {
    if path.is_dir() {
        ConfigLoader::new(path).paths()
    } else {
        vec![path.to_path_buf()]
    }
}

/// Validate one config file, or every config under a directory
pub fn validate(path: &Path) -> Result<()> {
    let console = CliConsole::new(true);
    let paths = config_paths(path);
    if paths.is_empty() {
        bail!("No YAML or JSON configs found under {}", path.display());
    }

    let mut failed = 0;
    for file in &paths {
        let config = match load_config(file) {
            Ok(config) => config,
            Err(e) => {
                console.error(&format!("{}: {:#}", file.display(), e));
                failed += 1;
                continue;
            }
        };

        let issues = ConfigValidator::issues(&config, global());
        if issues.is_empty() {
            console.success(&format!(
                "{}: {} datasets in {} categories",
                file.display(),
                config.dataset_count(),
                config.categories.len()
            ));
        } else {
            console.error(&format!("{}: {} issue(s)", file.display(), issues.len()));
            for issue in &issues {
                println!("    {}", issue);
            }
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} config(s) failed validation", failed, paths.len());
    }
    Ok(())
}

/// Print a config with defaults filled in
pub fn show(path: &Path, json: bool) -> Result<()> {
    let config = load_config(path)?;
    let rendered = if json {
        serde_json::to_string_pretty(&config)?
    } else {
        config.to_yaml_string()?
    };
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"
model_path: org/model
categories:
  - category: arithmetic
    datasets:
      - dataset: chain_sum
        size: 3
"#;

    const UNKNOWN_DATASET: &str = r#"
model_path: org/model
categories:
  - category: arithmetic
    datasets:
      - dataset: no_such_dataset
"#;

    #[test]
    fn test_validate_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok.yaml");
        std::fs::write(&path, VALID).unwrap();
        assert!(validate(&path).is_ok());
        assert!(show(&path, true).is_ok());
    }

    #[test]
    fn test_validate_directory_reports_failures() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.yaml"), VALID).unwrap();
        std::fs::write(dir.path().join("bad.yaml"), UNKNOWN_DATASET).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let err = validate(dir.path()).unwrap_err();
        assert!(err.to_string().contains("2 of 3"));
    }

    #[test]
    fn test_validate_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(validate(dir.path()).is_err());
    }
}
