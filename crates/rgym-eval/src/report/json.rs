//! JSON report generation

use anyhow::Result;

use crate::metrics::EvalSummary;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Generate a JSON report
    pub fn generate(summary: &EvalSummary) -> Result<String> {
        let json = serde_json::to_string_pretty(summary)?;
        Ok(json)
    }

    /// Generate a compact JSON report (no pretty printing)
    pub fn generate_compact(summary: &EvalSummary) -> Result<String> {
        let json = serde_json::to_string(summary)?;
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::sample_summary;

    #[test]
    fn test_json_generation() {
        let json = JsonReporter::generate(&sample_summary()).unwrap();
        assert!(json.contains("test-model"));
        assert!(json.contains("dataset_scores"));

        let compact = JsonReporter::generate_compact(&sample_summary()).unwrap();
        assert!(!compact.contains('\n'));
        let parsed: EvalSummary = serde_json::from_str(&compact).unwrap();
        assert_eq!(parsed.total_examples, 60);
    }
}
