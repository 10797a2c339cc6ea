use serde::Serialize;
use serde_json::{Map, Value};

pub const OTHER_LABEL: &str = "Other";

/// One `*_100g` entry, key kept exactly as the API spells it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nutrient {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Keeps per-100g keys whose value is a positive finite number (or a string
/// holding one), in the order the payload lists them.
pub fn parse_nutrients(obj: Option<&Map<String, Value>>) -> Vec<Nutrient> {
    let Some(obj) = obj else {
        return Vec::new();
    };
    obj.iter()
        .filter(|(key, _)| key.to_ascii_lowercase().ends_with("_100g"))
        .filter_map(|(key, v)| {
            let value = numeric(v)?;
            (value.is_finite() && value > 0.0).then(|| Nutrient {
                key: key.clone(),
                value,
            })
        })
        .collect()
}

/// At most `max_slices` slices: the largest `max_slices - 1` entries plus one
/// `"Other"` slice summing the rest, when there is a rest to sum.
pub fn pie_slices(nutrients: &[Nutrient], max_slices: usize) -> Vec<PieSlice> {
    let max_slices = max_slices.max(1);
    let mut sorted: Vec<&Nutrient> = nutrients
        .iter()
        .filter(|n| !n.key.trim().is_empty() && n.value.is_finite() && n.value > 0.0)
        .collect();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));

    if sorted.len() <= max_slices {
        return sorted
            .into_iter()
            .map(|n| PieSlice {
                label: n.key.clone(),
                value: n.value,
            })
            .collect();
    }

    let (top, rest) = sorted.split_at(max_slices - 1);
    let mut slices: Vec<PieSlice> = top
        .iter()
        .map(|n| PieSlice {
            label: n.key.clone(),
            value: n.value,
        })
        .collect();
    let other: f64 = rest.iter().map(|n| n.value).sum();
    if other > 0.0 {
        slices.push(PieSlice {
            label: OTHER_LABEL.to_string(),
            value: other,
        });
    }
    slices
}
