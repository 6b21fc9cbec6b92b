//! The TDD artifact produced by a successful orchestration.
//!
//! A `FeatureResult` is only ever constructed from a provider response that
//! parses into the full required shape; partial or malformed responses never
//! escape the engine as a success.

use serde::{Deserialize, Serialize};

/// One test scenario within a feature artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub description: String,
    pub steps: Vec<String>,
    pub expected_result: String,
}

/// Structured TDD artifact for one feature description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureResult {
    /// Restatement of the feature under specification.
    pub feature: String,
    /// Ordered acceptance criteria. Never empty.
    pub acceptance_criteria: Vec<String>,
    /// Ordered test scenarios. Never empty.
    pub test_scenarios: Vec<Scenario>,
    /// Complexity estimate, 1 (trivial) to 5 (hard).
    pub complexity: u8,
}

impl FeatureResult {
    /// Parse raw model output into a shape-valid `FeatureResult`.
    ///
    /// Models frequently wrap JSON in markdown code fences; those are
    /// stripped before parsing.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let body = strip_code_fences(raw);
        let result: Self =
            serde_json::from_str(body).map_err(|e| format!("not valid FeatureResult JSON: {e}"))?;
        result.validate()?;
        Ok(result)
    }

    fn validate(&self) -> Result<(), String> {
        if self.feature.trim().is_empty() {
            return Err("feature must not be empty".to_string());
        }
        if self.acceptance_criteria.is_empty() {
            return Err("acceptance_criteria must not be empty".to_string());
        }
        if self.test_scenarios.is_empty() {
            return Err("test_scenarios must not be empty".to_string());
        }
        if !(1..=5).contains(&self.complexity) {
            return Err(format!(
                "complexity must be in 1..=5, got {}",
                self.complexity
            ));
        }
        Ok(())
    }
}

/// Strip a single surrounding markdown code fence, if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line.
    let rest = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "feature": "Login com autenticação de dois fatores",
        "acceptance_criteria": ["Usuário informa credenciais válidas"],
        "test_scenarios": [{
            "description": "Login bem-sucedido",
            "steps": ["Abrir tela de login", "Informar credenciais"],
            "expected_result": "Acesso concedido"
        }],
        "complexity": 3
    }"#;

    #[test]
    fn parses_plain_json() {
        let result = FeatureResult::parse(VALID).unwrap();
        assert_eq!(result.complexity, 3);
        assert_eq!(result.test_scenarios.len(), 1);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{VALID}\n```");
        let result = FeatureResult::parse(&fenced).unwrap();
        assert_eq!(result.acceptance_criteria.len(), 1);
    }

    #[test]
    fn rejects_empty_criteria() {
        let raw = r#"{
            "feature": "f",
            "acceptance_criteria": [],
            "test_scenarios": [{"description": "d", "steps": [], "expected_result": "r"}],
            "complexity": 2
        }"#;
        assert!(FeatureResult::parse(raw).is_err());
    }

    #[test]
    fn rejects_out_of_range_complexity() {
        let raw = VALID.replace("\"complexity\": 3", "\"complexity\": 6");
        assert!(FeatureResult::parse(&raw).is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(FeatureResult::parse(r#"{"feature": "only a name"}"#).is_err());
    }

    #[test]
    fn rejects_non_json() {
        assert!(FeatureResult::parse("Sure! Here are some criteria: ...").is_err());
    }
}
