use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw candidate record as returned by the upstream recommendation backend.
///
/// The backend's payload shape varies by endpoint and dataset version:
/// single-title results carry `correlation`, seen-set results carry `score`,
/// and some records only carry an id. No field is guaranteed present, and
/// numeric fields sometimes arrive as strings. All shape-guessing lives in
/// [`crate::services::ranking::normalize`]; everything downstream of it only
/// sees [`RankedItem`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "anime_id")]
    pub id: Option<Value>,
    #[serde(default)]
    pub correlation: Option<Value>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub members: Option<Value>,
}

/// Canonical recommendation item returned to the presentation layer.
///
/// Invariants: `name` is never empty and `correlation` is always finite.
/// Both are enforced by the normalizer, never by the producer of the raw
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub name: String,
    pub correlation: f64,
}

/// One entry in a title search/listing response.
///
/// Extra upstream columns (members, genre, episodes, ...) are passed through
/// untouched; the picker only needs id and name but the table view renders
/// whatever else is there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleEntry {
    #[serde(default, alias = "anime_id")]
    pub id: Value,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paged title search/listing response, `{ count, results }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitlePage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<TitleEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_candidate_tolerates_missing_fields() {
        let candidate: RawCandidate = serde_json::from_value(json!({})).unwrap();
        assert!(candidate.name.is_none());
        assert!(candidate.correlation.is_none());
    }

    #[test]
    fn test_raw_candidate_accepts_anime_id_alias() {
        let candidate: RawCandidate =
            serde_json::from_value(json!({ "anime_id": 20, "correlation": 0.83 })).unwrap();
        assert_eq!(candidate.id, Some(json!(20)));
    }

    #[test]
    fn test_raw_candidate_ignores_unknown_fields() {
        let candidate: RawCandidate = serde_json::from_value(json!({
            "name": "Naruto",
            "score": "3.2",
            "genre": "Action",
            "episodes": 220
        }))
        .unwrap();
        assert_eq!(candidate.name.as_deref(), Some("Naruto"));
        assert_eq!(candidate.score, Some(json!("3.2")));
    }

    #[test]
    fn test_title_entry_passes_extra_columns_through() {
        let entry: TitleEntry = serde_json::from_value(json!({
            "anime_id": 20,
            "name": "Naruto",
            "members": 683297,
            "genre": "Action"
        }))
        .unwrap();
        assert_eq!(entry.id, json!(20));
        assert_eq!(entry.name, "Naruto");
        assert_eq!(entry.extra.get("members"), Some(&json!(683297)));

        let out = serde_json::to_value(&entry).unwrap();
        assert_eq!(out["genre"], json!("Action"));
    }
}
