//! Multi-step puzzles mixing deduction, induction, abduction and transduction
//!
//! Every puzzle threads a small state (a number, a word and a person) through
//! a sequence of steps. Each step reads the state, asks a question whose answer
//! becomes the new state, and the final step combines the number with the
//! length of the word.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coaching::{Curriculum, ScalarAttributeDefinition};
use crate::dataset::{
    DatasetConfig, DatasetSpec, Entry, ProceduralDataset, from_params, item_rng, resolve_seed,
};
use crate::error::GymResult;

pub const DATASET_NAME: &str = "multi_step_reasoning";

const WORD_BANK: [&str; 10] = [
    "lion", "tiger", "bear", "wolf", "eagle", "shark", "horse", "whale", "otter", "camel",
];

const NAME_BANK: [&str; 10] = [
    "Alice", "Bob", "Carol", "Dave", "Eve", "Frank", "Grace", "Heidi", "Ivan", "Judy",
];

const MIN_STEPS: usize = 5;
const MAX_STEPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiStepReasoningConfig {
    pub min_steps: usize,
    pub max_steps: usize,
    pub seed: Option<u64>,
    pub size: usize,
}

impl Default for MultiStepReasoningConfig {
    fn default() -> Self {
        Self {
            min_steps: MIN_STEPS,
            max_steps: MAX_STEPS,
            seed: None,
            size: 500,
        }
    }
}

impl DatasetConfig for MultiStepReasoningConfig {
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
        if !(MIN_STEPS <= self.min_steps
            && self.min_steps <= self.max_steps
            && self.max_steps <= MAX_STEPS)
        {
            return Err(format!(
                "steps must be between {} and {} with min_steps <= max_steps",
                MIN_STEPS, MAX_STEPS
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Deduction,
    Induction,
    Abduction,
    Transduction,
}

const MODES: [Mode; 4] = [
    Mode::Deduction,
    Mode::Induction,
    Mode::Abduction,
    Mode::Transduction,
];

#[derive(Debug, Clone)]
struct PuzzleState {
    num: i64,
    word: String,
    person: &'static str,
}

/// Renders a bank the way it is quoted in step text: `['lion', 'tiger', ...]`
fn format_bank(bank: &[&str]) -> String {
    let quoted: Vec<String> = bank.iter().map(|w| format!("'{}'", w)).collect();
    format!("[{}]", quoted.join(", "))
}

fn name_index(name: &str) -> usize {
    NAME_BANK.iter().position(|n| *n == name).unwrap_or(0)
}

fn name_at(offset: i64) -> &'static str {
    NAME_BANK[offset.rem_euclid(NAME_BANK.len() as i64) as usize]
}

/// Caesar shift over lowercase ASCII letters; other characters pass through
fn shift_letters(text: &str, shift: i64) -> String {
    text.chars()
        .map(|c| {
            let lower = c.to_ascii_lowercase();
            if lower.is_ascii_lowercase() {
                let pos = (lower as u8 - b'a') as i64;
                (b'a' + (pos + shift).rem_euclid(26) as u8) as char
            } else {
                c
            }
        })
        .collect()
}

/// Random order of two options
fn shuffled_pair<T>(rng: &mut StdRng, a: T, b: T) -> (T, T) {
    if rng.gen_bool(0.5) { (a, b) } else { (b, a) }
}

#[derive(Debug, Clone)]
pub struct MultiStepReasoningDataset {
    config: MultiStepReasoningConfig,
    seed: u64,
}

impl MultiStepReasoningDataset {
    pub fn new(config: MultiStepReasoningConfig) -> Self {
        let seed = resolve_seed(config.seed);
        Self { config, seed }
    }

    pub fn config(&self) -> &MultiStepReasoningConfig {
        &self.config
    }

    fn deduction(step: usize, rng: &mut StdRng, state: &mut PuzzleState) -> String {
        let choice: f64 = rng.r#gen();
        if choice < 0.33 {
            let mult = rng.gen_range(2..=5);
            let add = rng.gen_range(1..=9);
            let line = format!(
                "Step {}: Multiply {} by {} and add {}. What do you get?",
                step, state.num, mult, add
            );
            state.num = state.num * mult + add;
            line
        } else if choice < 0.66 {
            let threshold = rng.gen_range(4..=7);
            let classification = if state.word.chars().count() >= threshold {
                "long"
            } else {
                "short"
            };
            let line = format!(
                "Step {}: Words with at least {} letters are called 'long'. Is '{}' long or short?",
                step, threshold, state.word
            );
            state.word = classification.to_string();
            line
        } else {
            let mut names = NAME_BANK.to_vec();
            names.shuffle(rng);
            let (a, b, c) = (names[0], names[1], names[2]);
            state.person = a;
            format!(
                "Step {}: {} is older than {} and {} is older than {}. Who is the oldest?",
                step, a, b, b, c
            )
        }
    }

    fn induction(step: usize, rng: &mut StdRng, state: &mut PuzzleState) -> String {
        let choice: f64 = rng.r#gen();
        if choice < 0.33 {
            let inc = rng.gen_range(2..=5);
            let n = rng.gen_range(3..=5);
            let line = format!(
                "Step {}: Start at {} and add {} each time. What is the {}th term?",
                step, state.num, inc, n
            );
            state.num += inc * (n - 1);
            line
        } else if choice < 0.66 {
            let reps = rng.gen_range(1..=3);
            let last = state.word.chars().last().unwrap_or('a');
            let line = format!(
                "Step {}: Repeat the last letter of '{}' {} times. What word results?",
                step, state.word, reps
            );
            state.word.extend(std::iter::repeat_n(last, reps));
            line
        } else {
            let start = state.person;
            let n = rng.gen_range(1..=3);
            let target = name_at(name_index(start) as i64 + n);
            state.person = target;
            format!(
                "Step {}: Starting from {} and moving {} places forward alphabetically in {}, which name do you reach?",
                step,
                start,
                n,
                format_bank(&NAME_BANK)
            )
        }
    }

    fn abduction(step: usize, rng: &mut StdRng, state: &mut PuzzleState) -> String {
        let choice: f64 = rng.r#gen();
        if choice < 0.33 {
            let (mut secret, mut mult, mut add) = (0, 0, 0);
            for _ in 0..10 {
                secret = rng.gen_range(2..=8);
                mult = rng.gen_range(2..=5);
                add = state.num - secret * mult;
                if (1..=9).contains(&add) {
                    break;
                }
            }
            let wrong = secret + rng.gen_range(1..=4);
            let (first, second) = shuffled_pair(rng, secret, wrong);
            let line = format!(
                "Step {}: The number {} was made by multiplying a secret number by {} and adding {}. Was that number {} or {}?",
                step, state.num, mult, add, first, second
            );
            state.num = secret;
            line
        } else if choice < 0.66 {
            let shift = if rng.gen_bool(0.5) { 1 } else { 2 };
            let original = shift_letters(&state.word, -shift);
            let candidates: Vec<&str> = WORD_BANK
                .iter()
                .copied()
                .filter(|w| *w != original)
                .collect();
            let wrong = candidates.choose(rng).copied().unwrap_or(WORD_BANK[0]);
            let (first, second) = shuffled_pair(rng, original.as_str(), wrong);
            let line = format!(
                "Step {}: The word '{}' was formed by shifting a secret word forward by {} letters. Was the original word '{}' or '{}'?",
                step, state.word, shift, first, second
            );
            state.word = original;
            line
        } else {
            let shift = if rng.gen_bool(0.5) { 1 } else { 2 };
            let original = NAME_BANK.choose(rng).copied().unwrap_or(NAME_BANK[0]);
            let encoded = shift_letters(&original.to_lowercase(), shift);
            let candidates: Vec<&str> = NAME_BANK
                .iter()
                .copied()
                .filter(|n| *n != original)
                .collect();
            let wrong = candidates.choose(rng).copied().unwrap_or(NAME_BANK[0]);
            let (first, second) = shuffled_pair(rng, original, wrong);
            state.person = original;
            format!(
                "Step {}: A secret name was shifted forward by {} letters to become '{}'. Was it '{}' or '{}'?",
                step, shift, encoded, first, second
            )
        }
    }

    fn transduction(step: usize, rng: &mut StdRng, state: &mut PuzzleState) -> String {
        let choice: f64 = rng.r#gen();
        if choice < 0.33 {
            let magnitude = state.num.unsigned_abs();
            if rng.gen_bool(0.5) {
                let line = format!(
                    "Step {}: Write {} in binary. How many ones appear?",
                    step, state.num
                );
                state.num = magnitude.count_ones() as i64;
                line
            } else {
                let first_digit = format!("{:x}", magnitude)
                    .chars()
                    .next()
                    .and_then(|c| c.to_digit(16))
                    .unwrap_or(0);
                let line = format!(
                    "Step {}: Convert {} to hexadecimal. What is the decimal value of the first digit?",
                    step, state.num
                );
                state.num = first_digit as i64;
                line
            }
        } else if choice < 0.66 {
            let index = state.num.rem_euclid(WORD_BANK.len() as i64) as usize;
            let line = format!(
                "Step {}: Use {} as an index to pick a word from {}. Which word do you get?",
                step,
                state.num,
                format_bank(&WORD_BANK)
            );
            state.word = WORD_BANK[index].to_string();
            line
        } else {
            let person = state.person;
            let new_name = name_at(name_index(person) as i64 + state.num);
            state.person = new_name;
            format!(
                "Step {}: Starting from {}, move {} places forward in {}. Which name do you land on?",
                step,
                person,
                state.num,
                format_bank(&NAME_BANK)
            )
        }
    }

    fn generate_item(&self, rng: &mut StdRng, idx: usize) -> Entry {
        let steps = rng.gen_range(self.config.min_steps..=self.config.max_steps);

        let mut state = PuzzleState {
            num: rng.gen_range(2..=9),
            word: WORD_BANK.choose(rng).copied().unwrap_or("lion").to_string(),
            person: NAME_BANK.choose(rng).copied().unwrap_or("Alice"),
        };

        // The first four steps use every mode once
        let mut step_modes = MODES;
        step_modes.shuffle(rng);

        let mut lines = Vec::with_capacity(steps);
        for i in 1..steps {
            let mode = if i <= MODES.len() {
                step_modes[i - 1]
            } else {
                MODES.choose(rng).copied().unwrap_or(Mode::Deduction)
            };
            let line = match mode {
                Mode::Deduction => Self::deduction(i, rng, &mut state),
                Mode::Induction => Self::induction(i, rng, &mut state),
                Mode::Abduction => Self::abduction(i, rng, &mut state),
                Mode::Transduction => Self::transduction(i, rng, &mut state),
            };
            lines.push(line);
        }

        lines.push(format!(
            "Step {}: Add the number of letters in '{}' to {}. What is the result?",
            steps, state.word, state.num
        ));
        let answer = state.num + state.word.chars().count() as i64;

        Entry::new(DATASET_NAME, idx, lines.join("\n"), answer.to_string())
            .with_metadata("num_steps", steps)
    }
}

impl ProceduralDataset for MultiStepReasoningDataset {
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
        self.generate_item(&mut rng, idx)
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
    Curriculum::new("MultiStepReasoningCurriculum").with_attribute(ScalarAttributeDefinition::new(
        "num_steps",
        "max_steps",
        MIN_STEPS..=MAX_STEPS,
        "Maximum number of steps in the puzzle",
    ))
}

fn create(params: &Map<String, Value>) -> GymResult<Box<dyn ProceduralDataset>> {
    let config: MultiStepReasoningConfig = from_params(DATASET_NAME, params)?;
    Ok(Box::new(MultiStepReasoningDataset::new(config)))
}

pub fn spec() -> DatasetSpec {
    DatasetSpec {
        name: DATASET_NAME,
        category: "logic",
        description: "Chained deduction, induction, abduction and transduction steps",
        factory: create,
        curriculum: Some(curriculum),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_steps(seed: u64, size: usize, steps: usize) -> MultiStepReasoningDataset {
        MultiStepReasoningDataset::new(MultiStepReasoningConfig {
            min_steps: steps,
            max_steps: steps,
            seed: Some(seed),
            size,
        })
    }

    #[test]
    fn test_config_validation() {
        let config = MultiStepReasoningConfig {
            min_steps: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MultiStepReasoningConfig {
            min_steps: 8,
            max_steps: 7,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MultiStepReasoningConfig {
            max_steps: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deterministic() {
        let d1 = fixed_steps(42, 5, 5);
        let d2 = fixed_steps(42, 5, 5);
        for i in 0..d1.len() {
            assert_eq!(d1.get(i), d2.get(i));
        }
    }

    #[test]
    fn test_items() {
        let dataset = fixed_steps(1, 3, 5);
        for entry in dataset.entries() {
            let lines: Vec<&str> = entry.question.split('\n').collect();
            assert_eq!(lines.len(), 5);
            for (i, line) in lines.iter().enumerate() {
                assert!(line.starts_with(&format!("Step {}:", i + 1)), "{line}");
            }
            assert_eq!(dataset.score_answer(Some(&entry.answer), &entry), 1.0);
            assert_eq!(entry.source_dataset(), Some(DATASET_NAME));
            assert_eq!(entry.metadata["num_steps"], 5);
        }
    }

    #[test]
    fn test_answers_are_integers_across_seeds() {
        let dataset = MultiStepReasoningDataset::new(MultiStepReasoningConfig {
            seed: Some(7),
            size: 200,
            ..Default::default()
        });
        for entry in dataset.entries() {
            assert!(entry.answer.parse::<i64>().is_ok(), "{}", entry.answer);
            let steps = entry.metadata["num_steps"].as_u64().unwrap() as usize;
            assert!((MIN_STEPS..=MAX_STEPS).contains(&steps));
            assert_eq!(entry.question.lines().count(), steps);
        }
    }

    fn classify(line: &str) -> Mode {
        let (_, body) = line.split_once(": ").unwrap();
        if body.starts_with("Multiply")
            || body.starts_with("Words with at least")
            || body.ends_with("Who is the oldest?")
        {
            Mode::Deduction
        } else if body.starts_with("Start at")
            || body.starts_with("Repeat the last letter")
            || body.ends_with("which name do you reach?")
        {
            Mode::Induction
        } else if body.starts_with("The number")
            || body.starts_with("The word")
            || body.starts_with("A secret name")
        {
            Mode::Abduction
        } else {
            assert!(
                body.starts_with("Write")
                    || body.starts_with("Convert")
                    || body.starts_with("Use")
                    || body.ends_with("Which name do you land on?"),
                "unrecognised step: {line}"
            );
            Mode::Transduction
        }
    }

    #[test]
    fn test_first_four_steps_cover_all_modes() {
        let dataset = fixed_steps(3, 20, 5);
        for entry in dataset.entries() {
            let seen: Vec<Mode> = entry.question.lines().take(4).map(classify).collect();
            for mode in MODES {
                assert!(seen.contains(&mode), "missing {mode:?} in {seen:?}");
            }
        }
    }

    #[test]
    fn test_shift_letters() {
        assert_eq!(shift_letters("abc", 1), "bcd");
        assert_eq!(shift_letters("zebra", 2), "bgdtc");
        assert_eq!(shift_letters("bgdtc", -2), "zebra");
        assert_eq!(shift_letters("Eve", 1), "fwf");
    }

    #[test]
    fn test_format_bank() {
        assert_eq!(format_bank(&["a", "b"]), "['a', 'b']");
    }

    #[test]
    fn test_curriculum() {
        let mut curriculum = curriculum();
        let mut base = Map::new();
        base.insert("size".to_string(), Value::from(10));
        base.insert("seed".to_string(), Value::from(123));

        let cfg: MultiStepReasoningConfig = curriculum.generate_configuration(&base).unwrap();
        assert_eq!((cfg.size, cfg.seed), (10, Some(123)));
        assert_eq!(cfg.max_steps, 5);

        curriculum.increment_attr_level("num_steps").unwrap();
        let cfg: MultiStepReasoningConfig = curriculum.generate_configuration(&base).unwrap();
        assert_eq!(cfg.max_steps, 6);

        curriculum.decrement_attr_level("num_steps").unwrap();
        let cfg: MultiStepReasoningConfig = curriculum.generate_configuration(&base).unwrap();
        assert_eq!(cfg.max_steps, 5);
    }
}
