//! Dataset commands: list the registry and sample entries

use anyhow::{Context, Result, anyhow, bail};
use rgym_core::dataset::{Entry, global};
use serde_json::{Map, Value};

/// Arguments of `datasets generate`
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub name: String,
    pub size: usize,
    pub seed: Option<u64>,
    /// Raw `key=value` overrides
    pub params: Vec<String>,
    pub level: Option<usize>,
    pub format: String,
}

/// Print registered datasets, optionally only one category
pub fn list(category: Option<&str>) -> Result<()> {
    let specs: Vec<_> = global()
        .specs()
        .filter(|s| category.is_none_or(|c| s.category == c))
        .collect();

    if specs.is_empty() {
        println!("No datasets found.");
        return Ok(());
    }

    println!(
        "{:<25} {:<12} {:<11} {}",
        "Name", "Category", "Curriculum", "Description"
    );
    println!("{:-<80}", "");
    for spec in &specs {
        println!(
            "{:<25} {:<12} {:<11} {}",
            spec.name,
            spec.category,
            if spec.curriculum.is_some() { "yes" } else { "no" },
            spec.description
        );
    }
    println!("\nTotal: {} datasets", specs.len());
    Ok(())
}

/// Parse `key=value`; the value is read as JSON when possible, else as a string
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty parameter name in '{}'", raw);
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

/// Resolve the params passed to the dataset factory.
///
/// Curriculum levels apply over size and seed; explicit `--param` values win.
pub fn build_params(request: &GenerateRequest) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    params.insert("size".to_string(), Value::from(request.size));
    if let Some(seed) = request.seed {
        params.insert("seed".to_string(), Value::from(seed));
    }

    if let Some(level) = request.level {
        let mut curriculum = global()
            .curriculum(&request.name)
            .with_context(|| format!("Cannot apply level {} to {}", level, request.name))?;
        curriculum.set_global_level(level);
        params = curriculum.generate_params(&params);
    }

    for raw in &request.params {
        let (key, value) = parse_param(raw)?;
        params.insert(key, value);
    }
    Ok(params)
}

/// Generate entries and print them
pub fn generate(request: &GenerateRequest) -> Result<()> {
    let entries = generate_entries(request)?;
    let rendered = match request.format.to_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(&entries)?,
        "yaml" | "yml" => serde_yaml::to_string(&entries)?,
        other => bail!("unknown output format '{}' (expected json or yaml)", other),
    };
    println!("{}", rendered);
    Ok(())
}

fn generate_entries(request: &GenerateRequest) -> Result<Vec<Entry>> {
    let params = build_params(request)?;
    tracing::debug!(dataset = %request.name, ?params, "generating entries");
    let dataset = global().create(&request.name, &params)?;
    Ok(dataset.entries())
}
