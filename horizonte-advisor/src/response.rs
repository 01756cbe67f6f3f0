//! Generator output parsing.
//!
//! Models are told to answer with bare JSON but often wrap it in markdown
//! fences or add a sentence around it. The first JSON object in the text wins.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").expect("fence pattern is valid")
});

/// Accepts a string, a number or null.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Accepts a number, a numeric string or null.
fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub total_estimated_cost: String,
    #[serde(deserialize_with = "lenient_number")]
    pub total_estimated_time_months: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase {
    #[serde(deserialize_with = "lenient_number")]
    pub id: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_number")]
    pub duration_months: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub cost_range_eur: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanTask {
    #[serde(deserialize_with = "lenient_number")]
    pub phase_id: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub task: String,
    #[serde(deserialize_with = "lenient_string")]
    pub industry: String,
    pub materials: Vec<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub time_weeks: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub cost_range_eur: String,
    pub recommended_companies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialEstimate {
    #[serde(deserialize_with = "lenient_string")]
    pub material: String,
    #[serde(deserialize_with = "lenient_string")]
    pub estimated_quantity: String,
    #[serde(deserialize_with = "lenient_string")]
    pub estimated_cost_eur: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Risk {
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    /// HIGH, MEDIUM or LOW.
    #[serde(deserialize_with = "lenient_string")]
    pub impact_level: String,
}

/// A structured construction plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectPlan {
    pub project: ProjectSummary,
    pub phases: Vec<Phase>,
    pub tasks: Vec<PlanTask>,
    pub materials_summary: Vec<MaterialEstimate>,
    pub risk_analysis: Vec<Risk>,
    pub budget_tips: Vec<String>,
    pub recommended_companies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisorResponse {
    Text { text_response: String },
    ProjectPlan(ProjectPlan),
    /// Output that is not one of the two JSON formats.
    Raw { raw: String },
}

/// First JSON object in `text`, looking inside a fenced block first.
fn first_json_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    let candidates = FENCE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .chain(std::iter::once(text));

    for candidate in candidates {
        for (start, _) in candidate.match_indices('{') {
            let mut stream = serde_json::Deserializer::from_str(&candidate[start..]).into_iter::<Value>();
            if let Some(Ok(Value::Object(map))) = stream.next() {
                return Some(map);
            }
        }
    }
    None
}

/// Classify generator output. Never fails; unrecognised output comes back raw.
pub fn parse_response(text: &str) -> AdvisorResponse {
    let raw = || AdvisorResponse::Raw { raw: text.trim().to_string() };

    let Some(map) = first_json_object(text) else {
        debug!("no json object in generator output");
        return raw();
    };

    if let Some(Value::String(s)) = map.get("text_response") {
        return AdvisorResponse::Text { text_response: s.clone() };
    }

    if map.contains_key("project") || map.contains_key("phases") {
        match serde_json::from_value::<ProjectPlan>(Value::Object(map)) {
            Ok(plan) => return AdvisorResponse::ProjectPlan(plan),
            Err(e) => debug!(error = %e, "project plan did not deserialize"),
        }
    }

    raw()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_response() {
        let r = parse_response(r#"{"text_response": "Pershendetje!"}"#);
        assert_eq!(r, AdvisorResponse::Text { text_response: "Pershendetje!".into() });
    }

    #[test]
    fn test_fenced_plan_with_loose_types() {
        let text = "Here is your plan:\n```json\n{\"project\": {\"title\": \"Shtepi\", \"type\": \"CONSTRUCTION\", \
                    \"total_estimated_cost\": 85000, \"total_estimated_time_months\": \"12\"},\n\
                    \"phases\": [{\"id\": 1, \"name\": \"Themele\", \"duration_months\": 2, \"cost_range_eur\": \"10000-15000\"}],\n\
                    \"risk_analysis\": [{\"type\": \"Lageshtia\", \"description\": \"...\", \"impact_level\": \"HIGH\"}]}\n```\nGood luck";
        let AdvisorResponse::ProjectPlan(plan) = parse_response(text) else {
            panic!("expected a plan");
        };
        assert_eq!(plan.project.title, "Shtepi");
        assert_eq!(plan.project.total_estimated_cost, "85000");
        assert_eq!(plan.project.total_estimated_time_months, Some(12.0));
        assert_eq!(plan.phases[0].name, "Themele");
        assert_eq!(plan.risk_analysis[0].impact_level, "HIGH");
        assert!(plan.tasks.is_empty());
    }

    #[test]
    fn test_json_after_prose_without_fence() {
        let r = parse_response("Sure! {\"text_response\": \"ok\"} trailing");
        assert_eq!(r, AdvisorResponse::Text { text_response: "ok".into() });
    }

    #[test]
    fn test_unparseable_output_is_raw() {
        assert_eq!(parse_response("  just words  "), AdvisorResponse::Raw { raw: "just words".into() });
        assert_eq!(parse_response("{\"other\": 1}"), AdvisorResponse::Raw { raw: "{\"other\": 1}".into() });
    }

    #[test]
    fn test_serializes_with_format_tag() {
        let v = serde_json::to_value(parse_response(r#"{"text_response":"hi"}"#)).unwrap();
        assert_eq!(v["format"], "TEXT");
        assert_eq!(v["text_response"], "hi");
    }
}
