//! Helpers shared by the evaluation harness

mod answer;
mod prompts;

pub use answer::extract_answer;
pub use prompts::{DEFAULT_PROMPT_ID, SYSTEM_PROMPTS, system_prompt};
