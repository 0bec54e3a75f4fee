//! The pure core of the aggregation layer: normalization, seen-set
//! filtering and ranking. Every function here is total — malformed input
//! degrades to defaults instead of erroring.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::Value;

use crate::models::{RankedItem, RawCandidate};

/// Placeholder name for candidates carrying neither a name nor an id.
const UNKNOWN_NAME: &str = "Unknown";

/// Converts a raw upstream record into a canonical [`RankedItem`].
///
/// Name resolution order: `name` → `title` → stringified `id` → `"Unknown"`.
/// Correlation resolution order: `correlation` → `score` → `0.0`, accepting
/// JSON numbers and numeric strings; anything non-finite becomes `0.0`.
pub fn normalize(raw: &RawCandidate) -> RankedItem {
    let name = raw
        .name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
        .or_else(|| {
            raw.title
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned)
        })
        .or_else(|| raw.id.as_ref().and_then(scalar_to_string))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let correlation = raw
        .correlation
        .as_ref()
        .and_then(coerce_number)
        .or_else(|| raw.score.as_ref().and_then(coerce_number))
        .unwrap_or(0.0);

    RankedItem { name, correlation }
}

/// Removes items whose name matches an entry of `seen`, case-insensitively.
/// Relative order of survivors is preserved. An empty seen-set is the
/// identity.
pub fn filter_seen(items: Vec<RankedItem>, seen: &HashSet<String>) -> Vec<RankedItem> {
    if seen.is_empty() {
        return items;
    }
    let seen: HashSet<String> = seen.iter().map(|s| s.to_lowercase()).collect();
    items
        .into_iter()
        .filter(|item| !seen.contains(&item.name.to_lowercase()))
        .collect()
}

/// Sorts by descending correlation and truncates to the first `topk` items.
///
/// The sort is stable: equal correlations keep their upstream order, which
/// may itself encode a secondary signal such as popularity. A non-positive
/// `topk` or one past the end returns everything.
pub fn rank(mut items: Vec<RankedItem>, topk: i64) -> Vec<RankedItem> {
    items.sort_by(|a, b| {
        b.correlation
            .partial_cmp(&a.correlation)
            .unwrap_or(Ordering::Equal)
    });
    if topk > 0 {
        items.truncate(topk as usize);
    }
    items
}

/// Renders a scalar JSON value as a string, for id-derived names and
/// seen-set keys. Composite values and nulls yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerces a JSON value to a finite f64, accepting numbers and numeric
/// strings.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
