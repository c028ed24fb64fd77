//! Error types for rgym
//!
//! All library operations return [`GymResult`]. Variants carry an optional
//! context string describing where the error happened (a config path such as
//! `categories[0].datasets[2]` or a dataset name).

mod constructors;
mod conversions;
mod types;

pub use types::{GymError, GymResult};
