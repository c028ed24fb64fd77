//! Built-in system prompts, selected by `developer_prompt` in eval configs

pub const DEFAULT_PROMPT_ID: &str = "DeepSeekZero";

const DEEPSEEK_ZERO: &str = "A conversation between User and Assistant. The user asks a question, and the Assistant solves it.
The assistant first thinks about the reasoning process in the mind and then provides the user with the answer. The reasoning process and answer are enclosed within <think> </think> and <answer> </answer> tags, respectively, i.e., <think> reasoning process here </think>
<answer> answer here </answer>
Do not explain your reasoning inside the answer tags, provide only the final answer. When an example is provided, you should strictly follow the format of the output/answer in that example.
";

const DEFAULT: &str = "Given a problem, your task is to answer the question by thinking step-by-step in a clear and specific manner.
Once you have thought about the reasoning process, provide the answer in the following format:
<answer>answer here</answer>
Do not explain your reasoning inside the answer tags, provide only the final answer. When an example is provided, you should strictly follow the format of the output/answer in that example.
";

/// `(id, text)` pairs
pub const SYSTEM_PROMPTS: &[(&str, &str)] = &[("DeepSeekZero", DEEPSEEK_ZERO), ("default", DEFAULT)];

/// Look up a built-in prompt by id
pub fn system_prompt(id: &str) -> Option<&'static str> {
    SYSTEM_PROMPTS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(system_prompt(DEFAULT_PROMPT_ID).unwrap().contains("<think>"));
        assert!(system_prompt("default").unwrap().contains("<answer>answer here</answer>"));
        assert!(system_prompt("nope").is_none());
    }
}
