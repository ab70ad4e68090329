use serde::Serialize;
use serde_json::Value;

use crate::recommend::{Candidate, MatchContext, candidates_from_payload};

/// A model bucket as listed by `/buckets`, with display fallbacks applied.
/// The untouched payload is kept in `raw` for flag and risk-band lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Instruments (`items`, or legacy `legs`)
    pub items: Vec<Value>,
    pub live_price: Option<f64>,
    #[serde(skip)]
    pub raw: Value,
}

fn non_empty_text(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Bucket {
    /// `index` is the 0-based list position, used for placeholder ids and names.
    pub fn from_value(raw: &Value, index: usize) -> Self {
        let ordinal = index + 1;
        let id = non_empty_text(raw, "id")
            .or_else(|| non_empty_text(raw, "bucketId"))
            .unwrap_or_else(|| format!("bucket-{ordinal}"));
        let name = non_empty_text(raw, "name")
            .or_else(|| non_empty_text(raw, "title"))
            .unwrap_or_else(|| format!("Bucket {ordinal}"));
        let items = ["items", "legs"]
            .iter()
            .find_map(|field| raw.get(field)?.as_array().cloned())
            .unwrap_or_default();

        Self {
            id,
            name,
            description: non_empty_text(raw, "description"),
            items,
            live_price: raw.get("livePrice").and_then(Value::as_f64),
            raw: raw.clone(),
        }
    }
}

/// Normalize every bucket in a listing payload, preserving order.
pub fn normalize_buckets(payload: &Value) -> Vec<Bucket> {
    candidates_from_payload(payload, MatchContext::Bucket)
        .iter()
        .enumerate()
        .map(|(idx, raw)| Bucket::from_value(raw, idx))
        .collect()
}

impl Candidate for Bucket {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn ids(&self) -> Vec<String> {
        let mut ids = vec![self.id.clone()];
        for id in self.raw.ids() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn risk_band(&self) -> Option<String> {
        self.raw.risk_band()
    }

    fn is_flagged_recommended(&self) -> bool {
        self.raw.is_flagged_recommended()
    }

    fn allocation(&self) -> Option<Value> {
        if self.items.is_empty() {
            self.raw.allocation()
        } else {
            Some(Value::Array(self.items.clone()))
        }
    }
}
