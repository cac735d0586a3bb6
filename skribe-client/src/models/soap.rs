use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Vital sign placeholder the backend uses for values that were not measured
pub const NOT_RECORDED: &str = "Not recorded";

/// A note field. The generator usually emits a string, sometimes a list,
/// and occasionally a nested object; all of them render as one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    List(Vec<String>),
    Text(String),
    Structured(serde_json::Value),
}

impl TextOrList {
    pub fn joined(&self) -> String {
        match self {
            TextOrList::List(items) => items.join(", "),
            TextOrList::Text(text) => text.clone(),
            TextOrList::Structured(value) => value_text(value),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            TextOrList::List(items) => items.iter().all(|item| item.trim().is_empty()),
            TextOrList::Text(text) => text.trim().is_empty(),
            TextOrList::Structured(value) => value_text(value).trim().is_empty(),
        }
    }
}

impl From<&str> for TextOrList {
    fn from(text: &str) -> Self {
        TextOrList::Text(text.to_string())
    }
}

impl fmt::Display for TextOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Flatten arbitrary JSON: arrays join with `, `, objects become
/// `key: value` pairs joined with `; `, nulls vanish.
fn value_text(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key, value_text(value)))
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(key, text)| format!("{}: {}", key.replace('_', " "), text))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Structured clinical note: Subjective, Objective, Assessment, Plan.
///
/// When generation fails the backend still sends an object, carrying
/// `raw_response` / `parsing_error` or `error` instead of the sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjective: Option<Subjective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsing_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SoapNote {
    /// True when none of the four sections is present
    pub fn is_empty(&self) -> bool {
        self.subjective.is_none() && self.objective.is_none() && self.assessment.is_none() && self.plan.is_none()
    }

    /// Generation failure reported by the backend, if any
    pub fn failure(&self) -> Option<&str> {
        self.error.as_deref().or(self.parsing_error.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subjective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_present_illness: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_of_systems: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_medical_history: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_history: Option<TextOrList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_exam: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_tests: Option<TextOrList>,
}

/// Vital signs keyed by name (`blood_pressure`, `heart_rate`, ...). Values are
/// kept as raw JSON because the generator sometimes emits numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VitalSigns(pub BTreeMap<String, serde_json::Value>);

impl VitalSigns {
    /// Signs that were actually recorded, as `(label, value)` pairs
    pub fn recorded(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                if text.is_empty() || text == NOT_RECORDED {
                    None
                } else {
                    Some((name.replace('_', " "), text))
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_diagnosis: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential_diagnoses: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_impression: Option<TextOrList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_education: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_testing: Option<TextOrList>,
}
