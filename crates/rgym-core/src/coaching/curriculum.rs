//! Curriculum state

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::AttributeDefinition;
use crate::dataset::{DatasetConfig, from_params};
use crate::error::{GymError, GymResult};

/// Attribute definitions plus the current level of each attribute
#[derive(Debug, Clone)]
pub struct Curriculum {
    name: String,
    attributes: Vec<AttributeDefinition>,
    levels: HashMap<String, usize>,
}

impl Curriculum {
    /// Create a curriculum with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            levels: HashMap::new(),
        }
    }

    /// Add an attribute at level 0. An attribute with the same name is replaced.
    pub fn with_attribute(mut self, attribute: impl Into<AttributeDefinition>) -> Self {
        let attribute = attribute.into();
        let name = attribute.name().to_string();
        self.attributes.retain(|a| a.name() != name);
        self.attributes.push(attribute);
        self.levels.insert(name, 0);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute definitions in declaration order
    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    /// Look up an attribute definition
    pub fn attribute(&self, attr: &str) -> GymResult<&AttributeDefinition> {
        self.attributes
            .iter()
            .find(|a| a.name() == attr)
            .ok_or_else(|| GymError::curriculum(&self.name, format!("unknown attribute '{}'", attr)))
    }

    /// Current level of an attribute
    pub fn get_attr_level(&self, attr: &str) -> GymResult<usize> {
        self.attribute(attr)?;
        Ok(self.levels.get(attr).copied().unwrap_or(0))
    }

    /// Set an attribute to an explicit level
    pub fn set_attr_level(&mut self, attr: &str, level: usize) -> GymResult<()> {
        let max_level = self.attribute(attr)?.max_level();
        if level > max_level {
            return Err(GymError::curriculum(
                &self.name,
                format!(
                    "level {} out of range for attribute '{}' (max {})",
                    level, attr, max_level
                ),
            ));
        }
        self.levels.insert(attr.to_string(), level);
        tracing::debug!(curriculum = %self.name, attr, level, "set attribute level");
        Ok(())
    }

    /// Move an attribute one level up; `false` when already at the top
    pub fn increment_attr_level(&mut self, attr: &str) -> GymResult<bool> {
        let level = self.get_attr_level(attr)?;
        if level >= self.attribute(attr)?.max_level() {
            return Ok(false);
        }
        self.set_attr_level(attr, level + 1)?;
        Ok(true)
    }

    /// Move an attribute one level down; `false` when already at level 0
    pub fn decrement_attr_level(&mut self, attr: &str) -> GymResult<bool> {
        let level = self.get_attr_level(attr)?;
        if level == 0 {
            return Ok(false);
        }
        self.set_attr_level(attr, level - 1)?;
        Ok(true)
    }

    /// Set every attribute to `level`, capped at each attribute's top level
    pub fn set_global_level(&mut self, level: usize) {
        for attribute in &self.attributes {
            let capped = level.min(attribute.max_level());
            self.levels.insert(attribute.name().to_string(), capped);
        }
    }

    /// Move every attribute one level up; `false` when none could move
    pub fn increment_global_level(&mut self) -> GymResult<bool> {
        let names: Vec<String> = self.attributes.iter().map(|a| a.name().to_string()).collect();
        let mut moved = false;
        for name in names {
            moved |= self.increment_attr_level(&name)?;
        }
        Ok(moved)
    }

    /// Current levels, keyed by attribute name
    pub fn levels(&self) -> &HashMap<String, usize> {
        &self.levels
    }

    /// Params for the current levels layered over `base`
    pub fn generate_params(&self, base: &Map<String, Value>) -> Map<String, Value> {
        let mut params = base.clone();
        for attribute in &self.attributes {
            let level = self.levels.get(attribute.name()).copied().unwrap_or(0);
            attribute.apply(level, &mut params);
        }
        params
    }

    /// Typed dataset config for the current levels layered over `base`
    pub fn generate_configuration<C: DatasetConfig>(&self, base: &Map<String, Value>) -> GymResult<C> {
        from_params(&self.name, &self.generate_params(base))
    }
}
