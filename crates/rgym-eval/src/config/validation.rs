//! Eval config validation

use std::collections::HashSet;

use rgym_core::dataset::DatasetRegistry;
use rgym_core::error::{GymError, GymResult};
use thiserror::Error;

use super::EvalConfig;

/// A single problem found in a config
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {message}")]
pub struct ValidationIssue {
    /// Location in the document, e.g. `categories[0].datasets[1].dataset`
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationIssue> for GymError {
    fn from(issue: ValidationIssue) -> Self {
        GymError::config_with_context(issue.message, issue.path)
    }
}

/// Eval config validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a config, returning the first problem
    pub fn validate(config: &EvalConfig, registry: &DatasetRegistry) -> GymResult<()> {
        match Self::issues(config, registry).into_iter().next() {
            Some(issue) => Err(issue.into()),
            None => Ok(()),
        }
    }

    /// Every problem in the config, in document order
    pub fn issues(config: &EvalConfig, registry: &DatasetRegistry) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        Self::validate_model(config, &mut issues);
        Self::validate_limits(config, &mut issues);
        Self::validate_categories(config, registry, &mut issues);
        issues
    }

    fn validate_model(config: &EvalConfig, issues: &mut Vec<ValidationIssue>) {
        if config.model_path.trim().is_empty() {
            issues.push(ValidationIssue::new("model_path", "model_path cannot be empty"));
        }
        if config.system_prompt.is_none()
            && rgym_core::system_prompt(&config.developer_prompt).is_none()
        {
            issues.push(ValidationIssue::new(
                "developer_prompt",
                format!("unknown developer prompt '{}'", config.developer_prompt),
            ));
        }
        if config.developer_role.trim().is_empty() {
            issues.push(ValidationIssue::new("developer_role", "developer_role cannot be empty"));
        }
    }

    fn validate_limits(config: &EvalConfig, issues: &mut Vec<ValidationIssue>) {
        if config.eval_repeats == 0 {
            issues.push(ValidationIssue::new("eval_repeats", "eval_repeats must be at least 1"));
        }
        if config.max_tokens == 0 {
            issues.push(ValidationIssue::new("max_tokens", "max_tokens must be greater than 0"));
        }
        if config.top_p.is_nan() || config.top_p <= 0.0 || config.top_p > 1.0 {
            issues.push(ValidationIssue::new(
                "top_p",
                format!("top_p must be in (0, 1], got {}", config.top_p),
            ));
        }
        if config.temperature.is_nan() || config.temperature < 0.0 {
            issues.push(ValidationIssue::new(
                "temperature",
                format!("temperature must be non-negative, got {}", config.temperature),
            ));
        }
        if config.max_concurrent == 0 {
            issues.push(ValidationIssue::new(
                "max_concurrent",
                "max_concurrent must be at least 1",
            ));
        }
        if config.default_size == 0 {
            issues.push(ValidationIssue::new("default_size", "default_size must be greater than 0"));
        }
    }

    fn validate_categories(
        config: &EvalConfig,
        registry: &DatasetRegistry,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if config.categories.is_empty() {
            issues.push(ValidationIssue::new("categories", "at least one category is required"));
        }

        let mut seen = HashSet::new();
        for (i, category) in config.categories.iter().enumerate() {
            let path = format!("categories[{}]", i);

            if category.category.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    format!("{}.category", path),
                    "category name cannot be empty",
                ));
            } else if !seen.insert(category.category.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("{}.category", path),
                    format!("duplicate category '{}'", category.category),
                ));
            }

            if category.datasets.is_empty() {
                issues.push(ValidationIssue::new(
                    format!("{}.datasets", path),
                    "category must list at least one dataset",
                ));
            }

            for (j, entry) in category.datasets.iter().enumerate() {
                let path = format!("{}.datasets[{}]", path, j);

                if entry.dataset.trim().is_empty() {
                    issues.push(ValidationIssue::new(
                        format!("{}.dataset", path),
                        "dataset name cannot be empty",
                    ));
                    continue;
                }
                if !registry.contains(&entry.dataset) {
                    issues.push(ValidationIssue::new(
                        format!("{}.dataset", path),
                        format!(
                            "unknown dataset '{}'. Known datasets: {}",
                            entry.dataset,
                            registry.names().join(", ")
                        ),
                    ));
                    continue;
                }
                if entry.size == Some(0) {
                    issues.push(ValidationIssue::new(
                        format!("{}.size", path),
                        "size must be greater than 0",
                    ));
                    continue;
                }

                let params = entry.resolved_params(config.default_size, config.default_seed);
                if let Err(e) = registry.create(&entry.dataset, &params) {
                    issues.push(ValidationIssue::new(format!("{}.params", path), e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryConfig, DatasetConfig};

    fn valid_config() -> EvalConfig {
        EvalConfig::new("model")
            .with_category(
                CategoryConfig::new("arithmetic")
                    .with_dataset(DatasetConfig::new("chain_sum").with_size(10)),
            )
            .with_category(
                CategoryConfig::new("logic").with_dataset(
                    DatasetConfig::new("multi_step_reasoning").with_param("max_steps", 6),
                ),
            )
    }

    fn issue_paths(config: &EvalConfig) -> Vec<String> {
        ConfigValidator::issues(config, &DatasetRegistry::builtin())
            .into_iter()
            .map(|i| i.path)
            .collect()
    }

    #[test]
    fn test_valid_config() {
        assert!(ConfigValidator::validate(&valid_config(), &DatasetRegistry::builtin()).is_ok());
    }

    #[test]
    fn test_scalar_limits() {
        let mut config = valid_config();
        config.model_path = " ".to_string();
        config.eval_repeats = 0;
        config.max_tokens = 0;
        config.top_p = 0.0;
        config.temperature = -0.1;
        config.max_concurrent = 0;
        config.default_size = 0;
        assert_eq!(
            issue_paths(&config),
            vec![
                "model_path",
                "eval_repeats",
                "max_tokens",
                "top_p",
                "temperature",
                "max_concurrent",
                "default_size",
            ]
        );
    }

    #[test]
    fn test_unknown_developer_prompt() {
        let mut config = valid_config();
        config.developer_prompt = "nope".to_string();
        assert_eq!(issue_paths(&config), vec!["developer_prompt"]);

        config.system_prompt = Some("custom".to_string());
        assert!(issue_paths(&config).is_empty());
    }

    #[test]
    fn test_category_rules() {
        let config = EvalConfig::new("model");
        assert_eq!(issue_paths(&config), vec!["categories"]);

        let config = valid_config()
            .with_category(CategoryConfig::new("arithmetic"))
            .with_category(CategoryConfig::new(""));
        assert_eq!(
            issue_paths(&config),
            vec![
                "categories[2].category",
                "categories[2].datasets",
                "categories[3].category",
                "categories[3].datasets",
            ]
        );
    }

    #[test]
    fn test_dataset_rules() {
        let config = EvalConfig::new("model").with_category(
            CategoryConfig::new("mixed")
                .with_dataset(DatasetConfig::new(""))
                .with_dataset(DatasetConfig::new("sudoku"))
                .with_dataset(DatasetConfig::new("chain_sum").with_size(0))
                .with_dataset(DatasetConfig::new("chain_sum").with_param("max_digits", 0))
                .with_dataset(DatasetConfig::new("chain_sum").with_param("colour", "red")),
        );
        assert_eq!(
            issue_paths(&config),
            vec![
                "categories[0].datasets[0].dataset",
                "categories[0].datasets[1].dataset",
                "categories[0].datasets[2].size",
                "categories[0].datasets[3].params",
                "categories[0].datasets[4].params",
            ]
        );
    }

    #[test]
    fn test_validate_returns_first_issue() {
        let mut config = valid_config();
        config.max_tokens = 0;
        config.categories[0].datasets[0].dataset = "sudoku".to_string();
        let err = ConfigValidator::validate(&config, &DatasetRegistry::builtin()).unwrap_err();
        assert_eq!(err.context(), Some("max_tokens"));
        assert!(matches!(err, GymError::Config { .. }));
    }
}
