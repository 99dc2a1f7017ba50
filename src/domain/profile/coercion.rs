//! Tolerant coercion of loosely-shaped profile JSON.
//!
//! Generation output is not trusted: keys vary (`tone` vs `style`,
//! `confidence_in_stance` vs `confidence`), numbers arrive as strings,
//! lists arrive as comma-separated text. Everything is read into a
//! `ProfileDraft` of optional fields, then completed from a fallback.

use serde_json::{Map, Value};

use super::{Confidence, Guidance, Profile, Readiness, Stance};

const STANCE_KEYS: &[&str] = &["stance", "position"];
const CONFIDENCE_KEYS: &[&str] = &["confidence", "confidence_in_stance", "stance_confidence"];
const STYLE_KEYS: &[&str] = &["style", "tone", "communication_style"];
const EMOTION_KEYS: &[&str] = &["emotional_state", "emotion", "mood"];
const READINESS_KEYS: &[&str] = &["change_readiness", "readiness", "openness"];
const VALUES_KEYS: &[&str] = &["key_values", "values", "core_values"];
const EFFECTIVE_KEYS: &[&str] = &["effective", "do", "persuasion_strategy", "style_guidelines"];
const AVOID_KEYS: &[&str] = &["avoid", "dont", "avoid_tactics"];

/// A partially-known profile read from untrusted JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub stance: Option<Stance>,
    pub confidence: Option<Confidence>,
    pub style: Option<String>,
    pub emotional_state: Option<String>,
    pub change_readiness: Option<Readiness>,
    pub key_values: Option<Vec<String>>,
    pub effective: Option<Vec<String>>,
    pub avoid: Option<Vec<String>>,
}

impl ProfileDraft {
    /// Reads a draft from a JSON object. Returns `None` for any other JSON type.
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let guidance = first(map, &["guidance"]).and_then(Value::as_object);

        let mut effective = list_from(map, EFFECTIVE_KEYS);
        let mut avoid = list_from(map, AVOID_KEYS);
        if let Some(guidance) = guidance {
            effective = merge(list_from(guidance, EFFECTIVE_KEYS), effective);
            avoid = merge(list_from(guidance, AVOID_KEYS), avoid);
        }

        Some(Self {
            stance: first(map, STANCE_KEYS)
                .and_then(Value::as_str)
                .map(Stance::parse_lenient),
            confidence: first(map, CONFIDENCE_KEYS).and_then(confidence_from),
            style: first(map, STYLE_KEYS).and_then(label_from),
            emotional_state: first(map, EMOTION_KEYS).and_then(label_from),
            change_readiness: first(map, READINESS_KEYS).and_then(readiness_from),
            key_values: list_from(map, VALUES_KEYS),
            effective,
            avoid,
        })
    }

    /// True when nothing usable was found.
    pub fn is_empty(&self) -> bool {
        *self == ProfileDraft::default()
    }

    /// Completes the draft, taking missing fields from `fallback`.
    pub fn into_profile(self, fallback: &Profile) -> Profile {
        let guidance = Guidance::new(
            self.effective
                .unwrap_or_else(|| fallback.guidance().effective.clone()),
            self.avoid.unwrap_or_else(|| fallback.guidance().avoid.clone()),
        );

        Profile::new(self.stance.unwrap_or(fallback.stance()))
            .with_confidence(self.confidence.unwrap_or(fallback.confidence()))
            .with_style(self.style.as_deref().unwrap_or(fallback.style()))
            .with_emotional_state(
                self.emotional_state
                    .as_deref()
                    .unwrap_or(fallback.emotional_state()),
            )
            .with_readiness(self.change_readiness.unwrap_or(fallback.change_readiness()))
            .with_key_values(
                self.key_values
                    .unwrap_or_else(|| fallback.key_values().to_vec()),
            )
            .with_guidance(guidance)
    }
}

fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key).filter(|v| !v.is_null()))
}

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn confidence_from(value: &Value) -> Option<Confidence> {
    if let Some(n) = number_from(value) {
        // "80%" or 80 on a percentage scale
        let n = if n > 1.0 && n <= 100.0 { n / 100.0 } else { n };
        return Some(Confidence::clamped(n));
    }
    match value.as_str()?.trim().to_lowercase().as_str() {
        "high" | "very high" | "strong" => Some(Confidence::clamped(0.8)),
        "medium" | "moderate" => Some(Confidence::NEUTRAL),
        "low" | "very low" | "weak" => Some(Confidence::clamped(0.2)),
        _ => None,
    }
}

fn readiness_from(value: &Value) -> Option<Readiness> {
    if let Some(n) = number_from(value) {
        return Some(Readiness::clamped(n));
    }
    match value.as_str()?.trim().to_lowercase().as_str() {
        "high" | "open" | "very open" => Some(Readiness::clamped(8.0)),
        "medium" | "moderate" | "somewhat open" => Some(Readiness::MIDPOINT),
        "low" | "closed" | "resistant" => Some(Readiness::clamped(2.0)),
        _ => None,
    }
}

fn label_from(value: &Value) -> Option<String> {
    let label = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!label.is_empty()).then_some(label)
}

fn list_from(map: &Map<String, Value>, keys: &[&str]) -> Option<Vec<String>> {
    let mut found: Option<Vec<String>> = None;
    for key in keys {
        let Some(value) = map.get(*key) else { continue };
        let items = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Value::String(s) => s.split([',', ';', '\n']).map(str::to_string).collect(),
            _ => continue,
        };
        found = merge(found, Some(items));
    }
    found
}

fn merge(a: Option<Vec<String>>, b: Option<Vec<String>>) -> Option<Vec<String>> {
    match (a, b) {
        (Some(mut a), Some(b)) => {
            a.extend(b);
            Some(a)
        }
        (a, b) => a.or(b),
    }
}
