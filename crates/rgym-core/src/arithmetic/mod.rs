//! Arithmetic tasks

pub mod chain_sum;

pub use chain_sum::{ChainSumConfig, ChainSumDataset};
