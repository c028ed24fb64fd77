//! Chains of integer additions and subtractions

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::coaching::{Curriculum, RangeAttributeDefinition};
use crate::dataset::{
    DatasetConfig, DatasetSpec, Entry, ProceduralDataset, from_params, item_rng, resolve_seed,
};
use crate::error::GymResult;

pub const DATASET_NAME: &str = "chain_sum";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainSumConfig {
    pub min_terms: usize,
    pub max_terms: usize,
    pub min_digits: u32,
    pub max_digits: u32,
    /// Draw terms from `[-max, max]` instead of `[min, max]`
    pub allow_negation: bool,
    pub seed: Option<u64>,
    pub size: usize,
}

impl Default for ChainSumConfig {
    fn default() -> Self {
        Self {
            min_terms: 2,
            max_terms: 6,
            min_digits: 1,
            max_digits: 4,
            allow_negation: false,
            seed: None,
            size: 500,
        }
    }
}

impl DatasetConfig for ChainSumConfig {
    fn size(&self) -> usize {
        self.size
    }

    fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn validate(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("size must be greater than 0".to_string());
        }
        if self.min_terms == 0 {
            return Err("min_terms must be greater than 0".to_string());
        }
        if self.max_terms < self.min_terms {
            return Err("max_terms must be >= min_terms".to_string());
        }
        if self.min_digits == 0 {
            return Err("min_digits must be greater than 0".to_string());
        }
        if self.max_digits < self.min_digits {
            return Err("max_digits must be >= min_digits".to_string());
        }
        // 10^18 is the largest power of ten an i64 holds
        if self.max_digits > 18 {
            return Err("max_digits must be <= 18".to_string());
        }
        Ok(())
    }
}

/// Generates `a + b - c ... =` style problems
#[derive(Debug, Clone)]
pub struct ChainSumDataset {
    config: ChainSumConfig,
    seed: u64,
}

impl ChainSumDataset {
    pub fn new(config: ChainSumConfig) -> Self {
        let seed = resolve_seed(config.seed);
        Self { config, seed }
    }

    pub fn config(&self) -> &ChainSumConfig {
        &self.config
    }

    fn generate_task(
        &self,
        rng: &mut StdRng,
        num_terms: usize,
        min_value: i64,
        max_value: i64,
    ) -> (String, i128) {
        let constants: Vec<i64> = (0..num_terms)
            .map(|_| {
                if self.config.allow_negation {
                    rng.gen_range(-max_value..=max_value)
                } else {
                    rng.gen_range(min_value..=max_value)
                }
            })
            .collect();
        let operators: Vec<char> = (1..num_terms)
            .map(|_| if rng.gen_bool(0.5) { '+' } else { '-' })
            .collect();

        // Terms fit in i64; long chains of them need the wider sum
        let mut result = i128::from(constants[0]);
        let mut parts = vec![constants[0].to_string()];
        for (op, &value) in operators.iter().zip(&constants[1..]) {
            parts.push(op.to_string());
            parts.push(value.to_string());
            if *op == '+' {
                result += i128::from(value);
            } else {
                result -= i128::from(value);
            }
        }

        (parts.join(" "), result)
    }
}

impl ProceduralDataset for ChainSumDataset {
    fn name(&self) -> &str {
        DATASET_NAME
    }

    fn len(&self) -> usize {
        self.config.size
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn get(&self, idx: usize) -> Entry {
        let mut rng = item_rng(self.seed, idx);
        let num_terms = rng.gen_range(self.config.min_terms..=self.config.max_terms);
        let num_digits = rng.gen_range(self.config.min_digits..=self.config.max_digits);

        let min_value = if num_digits == 1 {
            0
        } else {
            10_i64.pow(num_digits - 1)
        };
        let max_value = 10_i64.pow(num_digits) - 1;

        let (expression, result) = self.generate_task(&mut rng, num_terms, min_value, max_value);

        Entry::new(
            DATASET_NAME,
            idx,
            format!(
                "State the final answer to the following arithmetic problem: {} =",
                expression
            ),
            result.to_string(),
        )
        .with_metadata("num_terms", num_terms)
        .with_metadata("num_digits", num_digits)
        .with_metadata("expression", expression)
        .with_metadata(
            "difficulty",
            json!({
                "num_terms": [self.config.min_terms, self.config.max_terms],
                "num_digits": [self.config.min_digits, self.config.max_digits],
            }),
        )
    }

    fn config_json(&self) -> Value {
        let mut value = serde_json::to_value(&self.config).unwrap_or(Value::Null);
        if let Some(obj) = value.as_object_mut() {
            obj.insert("seed".to_string(), Value::from(self.seed));
        }
        value
    }
}

pub fn curriculum() -> Curriculum {
    Curriculum::new("ChainSumCurriculum")
        .with_attribute(RangeAttributeDefinition::new(
            "num_terms",
            "min_terms",
            "max_terms",
            [2, 3, 4, 5],
            "Number of terms in the expression",
        ))
        .with_attribute(RangeAttributeDefinition::new(
            "num_digits",
            "min_digits",
            "max_digits",
            [1, 2, 4, 10],
            "Number of digits in each term",
        ))
}

fn create(params: &Map<String, Value>) -> GymResult<Box<dyn ProceduralDataset>> {
    let config: ChainSumConfig = from_params(DATASET_NAME, params)?;
    Ok(Box::new(ChainSumDataset::new(config)))
}

pub fn spec() -> DatasetSpec {
    DatasetSpec {
        name: DATASET_NAME,
        category: "arithmetic",
        description: "Chains of integer additions and subtractions",
        factory: create,
        curriculum: Some(curriculum),
    }
}
