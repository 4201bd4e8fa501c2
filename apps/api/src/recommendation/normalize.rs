//! Fail-soft parsing of the model's reply.
//!
//! The reply is untrusted text. It is read as a generic `serde_json::Value` and
//! every expected field is pulled out by its own total coercion function, so a
//! single bad field never discards the rest of the batch.
//!
//! Outcomes:
//! - not JSON, or a bare scalar → empty list + `error` + `raw_response`
//! - array → each object entry normalized, non-object entries skipped
//! - object wrapping an array (`recommended_assessments`, ...) → that array
//! - any other object → a single entry

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::catalog::split_tags;
use crate::llm_client::strip_json_fences;
use crate::recommendation::schema::{SchemaFields, SchemaVariant};
use crate::recommendation::{RecommendationItem, RecommendationResponse, MAX_RECOMMENDATIONS};

/// Keys under which a model sometimes nests the array it was asked for.
const WRAPPER_KEYS: &[&str] = &["recommended_assessments", "recommendations", "assessments"];

const FLAG_DEFAULT: &str = "No";

/// Parses, normalizes and truncates a raw model reply. Never fails.
pub fn parse_reply(raw: &str, schema: SchemaVariant) -> RecommendationResponse {
    let body = strip_json_fences(raw);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Model reply is not valid JSON: {e}");
            return RecommendationResponse::unparsed(raw);
        }
    };

    let Some(entries) = entries_of(value) else {
        warn!("Model reply is JSON but neither an array nor an object");
        return RecommendationResponse::unparsed(raw);
    };

    let fields = schema.fields();
    let total = entries.len();
    let items: Vec<RecommendationItem> = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => Some(normalize_entry(map, fields)),
            other => {
                warn!("Skipping non-object entry in model reply: {other}");
                None
            }
        })
        .take(MAX_RECOMMENDATIONS)
        .collect();

    if total > MAX_RECOMMENDATIONS {
        debug!("Model returned {total} entries, truncated to {MAX_RECOMMENDATIONS}");
    }

    RecommendationResponse::success(items)
}

fn entries_of(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => {
            for key in WRAPPER_KEYS {
                if matches!(map.get(*key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = map.remove(*key) {
                        return Some(items);
                    }
                }
            }
            Some(vec![Value::Object(map)])
        }
        _ => None,
    }
}

/// Builds one item from an object, defaulting every field independently.
pub fn normalize_entry(map: &Map<String, Value>, fields: &SchemaFields) -> RecommendationItem {
    RecommendationItem {
        name: fields.name.and_then(|key| optional_text(lookup(map, key))),
        url: text(lookup(map, fields.url)),
        adaptive_support: flag(lookup(map, fields.adaptive_support)),
        description: text(lookup(map, fields.description)),
        duration: duration(lookup(map, fields.duration)),
        remote_support: flag(lookup(map, fields.remote_support)),
        test_type: tags(lookup(map, fields.test_type)),
    }
}

/// Exact key first, then a case-insensitive match (`"Url"` for `"url"`).
fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn flag(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Bool(true)) => "Yes".to_string(),
        _ => FLAG_DEFAULT.to_string(),
    }
}

/// Minutes as a non-negative integer. Numbers are truncated, numeral-like
/// strings (`"30"`, `"45 min"`) use their leading digits, everything else is 0.
fn duration(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).unwrap_or(u32::MAX)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 => f.trunc().min(u32::MAX as f64) as u32,
                    _ => 0,
                }
            }
        }
        Some(Value::String(s)) => leading_integer(s),
        _ => 0,
    }
}

fn leading_integer(s: &str) -> u32 {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => split_tags(s),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::recommendation::PARSE_ERROR_MESSAGE;

    fn standard(raw: &str) -> RecommendationResponse {
        parse_reply(raw, SchemaVariant::Standard)
    }

    fn entry(i: usize) -> Value {
        json!({
            "url": format!("https://x/{i}"),
            "adaptive_support": "No",
            "description": format!("Assessment {i}"),
            "duration": i,
            "remote_support": "Yes",
            "test_type": ["Knowledge & Skills"]
        })
    }

    #[test]
    fn test_scenario_partial_entry_gets_defaults() {
        let resp = standard(r#"[{"url":"https://x/1","duration":"30","test_type":null}]"#);
        assert!(!resp.is_soft_failure());
        assert_eq!(
            resp.recommended_assessments,
            vec![RecommendationItem {
                name: None,
                url: "https://x/1".to_string(),
                adaptive_support: "No".to_string(),
                description: String::new(),
                duration: 30,
                remote_support: "No".to_string(),
                test_type: vec![],
            }]
        );
    }

    #[test]
    fn test_well_formed_reply_round_trips() {
        let reply = json!([
            {
                "url": "https://x/java",
                "adaptive_support": "Yes",
                "description": "Java 8 knowledge test",
                "duration": 18,
                "remote_support": "Yes",
                "test_type": ["Knowledge & Skills"]
            },
            {
                "url": "https://x/opq",
                "adaptive_support": "No",
                "description": "Personality questionnaire",
                "duration": 25,
                "remote_support": "Yes",
                "test_type": ["Personality & Behavior", "Competencies"]
            }
        ]);
        let resp = standard(&reply.to_string());
        let output = serde_json::to_value(&resp.recommended_assessments).unwrap();
        assert_eq!(output, reply);
        assert!(resp.error.is_none());
        assert!(resp.raw_response.is_none());
    }

    #[test]
    fn test_prose_reply_is_soft_failure() {
        let raw = "I'd recommend the Java 8 test and the OPQ32r questionnaire.";
        let resp = standard(raw);
        assert!(resp.recommended_assessments.is_empty());
        assert_eq!(resp.error.as_deref(), Some(PARSE_ERROR_MESSAGE));
        assert_eq!(resp.raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn test_truncated_json_is_soft_failure() {
        let resp = standard(r#"[{"url": "https://x/1", "duration": 3"#);
        assert!(resp.is_soft_failure());
        assert!(resp.recommended_assessments.is_empty());
    }

    #[test]
    fn test_json_scalar_is_soft_failure() {
        for raw in ["42", "\"just a string\"", "null", "true"] {
            let resp = standard(raw);
            assert!(resp.is_soft_failure(), "{raw} should be a soft failure");
            assert_eq!(resp.raw_response.as_deref(), Some(raw));
        }
    }

    #[test]
    fn test_raw_response_keeps_untouched_text_including_fences() {
        let raw = "```json\nnot json at all\n```";
        assert_eq!(standard(raw).raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn test_fenced_reply_is_parsed() {
        let resp = standard("```json\n[{\"url\": \"https://x/1\", \"duration\": 20}]\n```");
        assert_eq!(resp.recommended_assessments.len(), 1);
        assert_eq!(resp.recommended_assessments[0].duration, 20);
    }

    #[test]
    fn test_empty_array_is_success_with_no_items() {
        let resp = standard("[]");
        assert!(!resp.is_soft_failure());
        assert!(resp.recommended_assessments.is_empty());
    }

    #[test]
    fn test_truncates_to_ten_preserving_order() {
        let reply = Value::Array((1..=15).map(entry).collect());
        let resp = standard(&reply.to_string());
        assert_eq!(resp.recommended_assessments.len(), MAX_RECOMMENDATIONS);
        let urls: Vec<&str> = resp
            .recommended_assessments
            .iter()
            .map(|i| i.url.as_str())
            .collect();
        let expected: Vec<String> = (1..=10).map(|i| format!("https://x/{i}")).collect();
        assert_eq!(urls, expected);
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let reply = json!(["https://x/0", 7, null, entry(1), ["nested"], entry(2)]);
        let resp = standard(&reply.to_string());
        assert_eq!(resp.recommended_assessments.len(), 2);
        assert_eq!(resp.recommended_assessments[0].url, "https://x/1");
        assert_eq!(resp.recommended_assessments[1].url, "https://x/2");
    }

    #[test]
    fn test_wrapped_array_is_unwrapped() {
        let reply = json!({"recommended_assessments": [entry(1), entry(2)]});
        let resp = standard(&reply.to_string());
        assert_eq!(resp.recommended_assessments.len(), 2);
    }

    #[test]
    fn test_single_object_becomes_single_item() {
        let resp = standard(&entry(4).to_string());
        assert_eq!(resp.recommended_assessments.len(), 1);
        assert_eq!(resp.recommended_assessments[0].duration, 4);
    }

    #[test]
    fn test_missing_duration_defaults_to_zero() {
        let resp = standard(r#"[{"url": "https://x/1"}, {"url": "https://x/2", "duration": null}]"#);
        assert!(resp.recommended_assessments.iter().all(|i| i.duration == 0));
    }

    #[test]
    fn test_duration_coercions() {
        assert_eq!(duration(Some(&json!(45))), 45);
        assert_eq!(duration(Some(&json!(45.9))), 45);
        assert_eq!(duration(Some(&json!(-5))), 0);
        assert_eq!(duration(Some(&json!(-2.5))), 0);
        assert_eq!(duration(Some(&json!("30"))), 30);
        assert_eq!(duration(Some(&json!(" 40 minutes"))), 40);
        assert_eq!(duration(Some(&json!("about 30"))), 0);
        assert_eq!(duration(Some(&json!("-10"))), 0);
        assert_eq!(duration(Some(&json!(true))), 0);
        assert_eq!(duration(Some(&json!({"minutes": 30}))), 0);
        assert_eq!(duration(Some(&json!(u64::MAX))), u32::MAX);
        assert_eq!(duration(None), 0);
    }

    #[test]
    fn test_flag_coercions() {
        assert_eq!(flag(Some(&json!("Yes"))), "Yes");
        assert_eq!(flag(Some(&json!(true))), "Yes");
        assert_eq!(flag(Some(&json!(false))), "No");
        assert_eq!(flag(Some(&json!(""))), "No");
        assert_eq!(flag(Some(&json!(1))), "No");
        assert_eq!(flag(None), "No");
    }

    #[test]
    fn test_tag_coercions() {
        assert_eq!(
            tags(Some(&json!(["Technical", 3, " Behavioral ", null, ""]))),
            vec!["Technical", "Behavioral"]
        );
        assert_eq!(
            tags(Some(&json!("Technical, Behavioral"))),
            vec!["Technical", "Behavioral"]
        );
        assert!(tags(Some(&Value::Null)).is_empty());
        assert!(tags(Some(&json!({"a": 1}))).is_empty());
        assert!(tags(None).is_empty());
    }

    #[test]
    fn test_text_coercions() {
        assert_eq!(text(Some(&json!("desc"))), "desc");
        assert_eq!(text(Some(&json!(12))), "12");
        assert_eq!(text(Some(&json!(["a"]))), "");
        assert_eq!(text(None), "");
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let resp = standard(r#"[{"URL": "https://x/1", "Duration": "15"}]"#);
        assert_eq!(resp.recommended_assessments[0].url, "https://x/1");
        assert_eq!(resp.recommended_assessments[0].duration, 15);
    }

    #[test]
    fn test_labeled_schema_reads_labeled_keys() {
        let reply = json!([{
            "Assessment Name": "Java 8 (New)",
            "URL": "https://x/java",
            "Adaptive Support": "Yes",
            "Description": "Java 8",
            "Duration": 18,
            "Remote Support": "Yes",
            "Type": ["Knowledge & Skills"]
        }]);
        let resp = parse_reply(&reply.to_string(), SchemaVariant::Labeled);
        let item = &resp.recommended_assessments[0];
        assert_eq!(item.name.as_deref(), Some("Java 8 (New)"));
        assert_eq!(item.url, "https://x/java");
        assert_eq!(item.adaptive_support, "Yes");
        assert_eq!(item.duration, 18);
        assert_eq!(item.test_type, vec!["Knowledge & Skills"]);
    }

    #[test]
    fn test_standard_schema_ignores_name() {
        let resp = standard(r#"[{"url": "https://x/1", "name": "Java 8"}]"#);
        assert!(resp.recommended_assessments[0].name.is_none());
    }

    #[test]
    fn test_every_item_has_bounded_len_and_numeric_duration() {
        let replies = [
            "[]".to_string(),
            r#"[{"duration": "x"}, {"duration": -1}, {"duration": 2.5}, {}]"#.to_string(),
            Value::Array((0..40).map(entry).collect()).to_string(),
            "definitely not json".to_string(),
        ];
        for raw in &replies {
            let resp = standard(raw);
            assert!(resp.recommended_assessments.len() <= MAX_RECOMMENDATIONS);
            let json = serde_json::to_value(&resp).unwrap();
            for item in json["recommended_assessments"].as_array().unwrap() {
                assert!(item["duration"].is_u64());
            }
        }
    }
}
