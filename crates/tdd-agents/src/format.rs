//! Rendering of `FeatureResult` as JSON or Markdown.

use orchestration::{FeatureResult, OutputFormat};

/// Render a result in the requested format.
///
/// JSON is the artifact's fields verbatim; Markdown represents every field.
pub fn render(result: &FeatureResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            // FeatureResult serializes infallibly: plain strings and ints.
            serde_json::to_string_pretty(result).unwrap_or_default()
        }
        OutputFormat::Markdown => render_markdown(result),
    }
}

fn render_markdown(result: &FeatureResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", result.feature));

    out.push_str("## Acceptance Criteria\n\n");
    for criterion in &result.acceptance_criteria {
        out.push_str(&format!("- {criterion}\n"));
    }

    out.push_str("\n## Test Scenarios\n");
    for (index, scenario) in result.test_scenarios.iter().enumerate() {
        out.push_str(&format!("\n### {}. {}\n\n", index + 1, scenario.description));
        for step in &scenario.steps {
            out.push_str(&format!("1. {step}\n"));
        }
        out.push_str(&format!("\n**Expected:** {}\n", scenario.expected_result));
    }

    out.push_str(&format!("\n## Complexity\n\n{} / 5\n", result.complexity));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestration::Scenario;

    fn sample() -> FeatureResult {
        FeatureResult {
            feature: "Login".to_string(),
            acceptance_criteria: vec!["Valid credentials grant access".to_string()],
            test_scenarios: vec![Scenario {
                description: "Happy path".to_string(),
                steps: vec!["Open login form".to_string(), "Submit".to_string()],
                expected_result: "Session created".to_string(),
            }],
            complexity: 2,
        }
    }

    #[test]
    fn json_roundtrips_the_fields() {
        let rendered = render(&sample(), OutputFormat::Json);
        let parsed: FeatureResult = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn markdown_represents_every_field() {
        let rendered = render(&sample(), OutputFormat::Markdown);
        assert!(rendered.contains("# Login"));
        assert!(rendered.contains("Valid credentials grant access"));
        assert!(rendered.contains("Happy path"));
        assert!(rendered.contains("Open login form"));
        assert!(rendered.contains("Session created"));
        assert!(rendered.contains("2 / 5"));
    }
}
