//! Attribute definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute that sets a single field to the value at the current level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarAttributeDefinition {
    pub name: String,
    pub field_name: String,
    pub levels: Vec<Value>,
    #[serde(default)]
    pub description: String,
}

impl ScalarAttributeDefinition {
    pub fn new<V: Into<Value>>(
        name: impl Into<String>,
        field_name: impl Into<String>,
        levels: impl IntoIterator<Item = V>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_name: field_name.into(),
            levels: levels.into_iter().map(Into::into).collect(),
            description: description.into(),
        }
    }
}

/// Attribute that sets a lower/upper field pair.
///
/// At level `k` the range spans levels `0..=k`: the lower field gets
/// `levels[0]` and the upper field `levels[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeAttributeDefinition {
    pub name: String,
    pub lower_field_name: String,
    pub upper_field_name: String,
    pub levels: Vec<Value>,
    #[serde(default)]
    pub description: String,
}

impl RangeAttributeDefinition {
    pub fn new<V: Into<Value>>(
        name: impl Into<String>,
        lower_field_name: impl Into<String>,
        upper_field_name: impl Into<String>,
        levels: impl IntoIterator<Item = V>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            lower_field_name: lower_field_name.into(),
            upper_field_name: upper_field_name.into(),
            levels: levels.into_iter().map(Into::into).collect(),
            description: description.into(),
        }
    }

    /// (lower, upper) values at `level`
    pub fn bounds(&self, level: usize) -> Option<(&Value, &Value)> {
        let upper = self.levels.get(level)?;
        let lower = self.levels.first()?;
        Some((lower, upper))
    }
}

/// A curriculum attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeDefinition {
    Scalar(ScalarAttributeDefinition),
    Range(RangeAttributeDefinition),
}

impl AttributeDefinition {
    pub fn name(&self) -> &str {
        match self {
            AttributeDefinition::Scalar(def) => &def.name,
            AttributeDefinition::Range(def) => &def.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            AttributeDefinition::Scalar(def) => &def.description,
            AttributeDefinition::Range(def) => &def.description,
        }
    }

    pub fn levels(&self) -> &[Value] {
        match self {
            AttributeDefinition::Scalar(def) => &def.levels,
            AttributeDefinition::Range(def) => &def.levels,
        }
    }

    /// Highest valid level index
    pub fn max_level(&self) -> usize {
        self.levels().len().saturating_sub(1)
    }

    /// Write the field values for `level` into `params`
    pub fn apply(&self, level: usize, params: &mut Map<String, Value>) {
        match self {
            AttributeDefinition::Scalar(def) => {
                if let Some(value) = def.levels.get(level) {
                    params.insert(def.field_name.clone(), value.clone());
                }
            }
            AttributeDefinition::Range(def) => {
                if let Some((lower, upper)) = def.bounds(level) {
                    params.insert(def.lower_field_name.clone(), lower.clone());
                    params.insert(def.upper_field_name.clone(), upper.clone());
                }
            }
        }
    }
}

impl From<ScalarAttributeDefinition> for AttributeDefinition {
    fn from(def: ScalarAttributeDefinition) -> Self {
        AttributeDefinition::Scalar(def)
    }
}

impl From<RangeAttributeDefinition> for AttributeDefinition {
    fn from(def: RangeAttributeDefinition) -> Self {
        AttributeDefinition::Range(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_use_first_and_current_level() {
        let def = RangeAttributeDefinition::new("width", "min_w", "max_w", [4, 2, 8], "");
        assert_eq!(def.bounds(0).unwrap(), (&Value::from(4), &Value::from(4)));
        assert_eq!(def.bounds(1).unwrap(), (&Value::from(4), &Value::from(2)));
        assert_eq!(def.bounds(2).unwrap(), (&Value::from(4), &Value::from(8)));
        assert!(def.bounds(3).is_none());

        let mut params = Map::new();
        AttributeDefinition::from(def).apply(2, &mut params);
        assert_eq!(params["min_w"], 4);
        assert_eq!(params["max_w"], 8);
    }

    #[test]
    fn test_scalar_apply() {
        let def: AttributeDefinition =
            ScalarAttributeDefinition::new("depth", "max_depth", [1, 2, 3], "tree depth").into();
        let mut params = Map::new();
        def.apply(2, &mut params);
        assert_eq!(params["max_depth"], 3);
        assert_eq!(def.max_level(), 2);
        assert_eq!(def.description(), "tree depth");
    }
}
