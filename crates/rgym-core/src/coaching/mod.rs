//! Difficulty curricula
//!
//! A curriculum is a set of attribute definitions. Each attribute owns an
//! ordered list of levels and knows which dataset param(s) it drives, so
//! moving an attribute up a level makes the generated dataset harder.

mod attributes;
mod curriculum;

pub use attributes::{AttributeDefinition, RangeAttributeDefinition, ScalarAttributeDefinition};
pub use curriculum::Curriculum;
