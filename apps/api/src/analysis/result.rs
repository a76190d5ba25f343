//! Loosely-typed view over the model's JSON reply.
//!
//! The reply is untrusted: keys may be missing, misspelt or hold the wrong
//! shape. Accessors never fail. A scalar that is absent (or not a scalar)
//! comes back as `None`; a sequence that is absent comes back empty, and
//! items of the wrong shape are skipped.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

/// One row of the career domain table.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainScore {
    pub domain: Option<String>,
    pub score: Option<String>,
    pub justification: Option<String>,
}

/// One row of the competency table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetencyScore {
    pub category: Option<String>,
    pub score: Option<String>,
    pub strength: Option<String>,
    pub observation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallSummary {
    pub overall_score: Option<String>,
    pub key_strengths: Vec<String>,
    pub areas_to_improve: Vec<String>,
    pub talent_potential: Option<String>,
}

impl AnalysisResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn language(&self) -> Option<String> {
        scalar(self.0.get("language"))
    }

    pub fn domain_scores(&self) -> Vec<DomainScore> {
        rows(self.0.get("domain_scores"))
            .map(|row| DomainScore {
                domain: scalar(row.get("domain")),
                score: scalar(row.get("score")),
                justification: scalar(row.get("justification")),
            })
            .collect()
    }

    pub fn competency_scores(&self) -> Vec<CompetencyScore> {
        rows(self.0.get("competency_scores"))
            .map(|row| CompetencyScore {
                category: scalar(row.get("category")),
                score: scalar(row.get("score")),
                strength: scalar(row.get("strength")),
                observation: scalar(row.get("observation")),
            })
            .collect()
    }

    pub fn strategic_insights(&self) -> Option<String> {
        scalar(self.0.get("strategic_insights"))
    }

    pub fn development_recommendations(&self) -> Vec<String> {
        list(self.0.get("development_recommendations"))
    }

    pub fn comparative_benchmarking(&self) -> Option<String> {
        scalar(self.0.get("comparative_benchmarking"))
    }

    pub fn overall_summary(&self) -> OverallSummary {
        let Some(summary) = self.0.get("overall_summary").and_then(Value::as_object) else {
            return OverallSummary::default();
        };

        OverallSummary {
            overall_score: scalar(summary.get("overall_score")),
            key_strengths: list(summary.get("key_strengths")),
            areas_to_improve: list(summary.get("areas_to_improve")),
            talent_potential: scalar(summary.get("talent_potential")),
        }
    }
}

/// Display form of a scalar JSON value. Strings come back unquoted.
fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|item| scalar(Some(item))).collect())
        .unwrap_or_default()
}

fn rows(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_result_accessors() {
        let result = AnalysisResult::new(json!({
            "language": "English",
            "domain_scores": [
                {"domain": "IT", "score": 90, "justification": "Good skills"},
                {"domain": "Management", "score": 80, "justification": "Some experience"}
            ],
            "competency_scores": [
                {"category": "Technical", "score": 90, "strength": "Good coding", "observation": "None"}
            ],
            "strategic_insights": "This candidate has potential",
            "development_recommendations": ["Learn Go", "Improve communication skills"],
            "comparative_benchmarking": "Above average in the field",
            "overall_summary": {
                "overall_score": 85,
                "key_strengths": ["Technical knowledge", "Problem solving"],
                "areas_to_improve": ["Communication"],
                "talent_potential": "High"
            }
        }));

        assert_eq!(result.language().as_deref(), Some("English"));
        let domains = result.domain_scores();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[1].domain.as_deref(), Some("Management"));
        assert_eq!(domains[0].score.as_deref(), Some("90"));
        assert_eq!(
            result.competency_scores()[0].strength.as_deref(),
            Some("Good coding")
        );
        assert_eq!(result.development_recommendations().len(), 2);
        assert_eq!(
            result.comparative_benchmarking().as_deref(),
            Some("Above average in the field")
        );
        let summary = result.overall_summary();
        assert_eq!(summary.overall_score.as_deref(), Some("85"));
        assert_eq!(summary.key_strengths, vec!["Technical knowledge", "Problem solving"]);
        assert_eq!(summary.talent_potential.as_deref(), Some("High"));
    }

    #[test]
    fn test_empty_object_degrades_to_defaults() {
        let result = AnalysisResult::new(json!({}));
        assert!(result.language().is_none());
        assert!(result.domain_scores().is_empty());
        assert!(result.competency_scores().is_empty());
        assert!(result.strategic_insights().is_none());
        assert!(result.development_recommendations().is_empty());
        assert!(result.comparative_benchmarking().is_none());
        assert_eq!(result.overall_summary(), OverallSummary::default());
    }

    #[test]
    fn test_wrong_shapes_are_tolerated() {
        let result = AnalysisResult::new(json!({
            "language": {"name": "English"},
            "domain_scores": "IT, Management",
            "competency_scores": [42, {"category": "Leadership"}],
            "development_recommendations": ["Ship more", {"nested": true}, 7],
            "overall_summary": ["not", "an", "object"]
        }));

        assert!(result.language().is_none());
        assert!(result.domain_scores().is_empty());

        let competencies = result.competency_scores();
        assert_eq!(competencies.len(), 1);
        assert_eq!(competencies[0].category.as_deref(), Some("Leadership"));
        assert!(competencies[0].score.is_none());

        assert_eq!(result.development_recommendations(), vec!["Ship more", "7"]);
        assert_eq!(result.overall_summary(), OverallSummary::default());
    }

    #[test]
    fn test_null_scalars_are_missing() {
        let result = AnalysisResult::new(json!({
            "strategic_insights": null,
            "overall_summary": {"overall_score": null, "talent_potential": "Moderate"}
        }));
        assert!(result.strategic_insights().is_none());
        let summary = result.overall_summary();
        assert!(summary.overall_score.is_none());
        assert_eq!(summary.talent_potential.as_deref(), Some("Moderate"));
    }

    #[test]
    fn test_string_and_float_scores_display_as_given() {
        let result = AnalysisResult::new(json!({
            "domain_scores": [
                {"domain": "Data", "score": "75", "justification": "SQL"},
                {"domain": "Ops", "score": 62.5, "justification": "On call"}
            ]
        }));
        let domains = result.domain_scores();
        assert_eq!(domains[0].score.as_deref(), Some("75"));
        assert_eq!(domains[1].score.as_deref(), Some("62.5"));
    }
}
