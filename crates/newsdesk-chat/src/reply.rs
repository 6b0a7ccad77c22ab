//! Reply extraction and post-processing.

use crate::config::{BrandRename, ReplyConfig};
use crate::error::ChatError;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// Pulls the reply text out of a chat response.
///
/// The backend answers either `{"summary": {"text": ...}}` or
/// `{"messages": [...]}`. Summary text wins when both are present and
/// non-empty; otherwise the first message is used.
pub fn extract_reply(body: &Value) -> Option<String> {
    let summary = body
        .get("summary")
        .and_then(|s| s.get("text"))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty());
    if let Some(text) = summary {
        return Some(text.to_string());
    }

    let first = body.get("messages")?.as_array()?.first()?;
    let text = match first {
        Value::String(text) => text.as_str(),
        Value::Object(message) => message
            .get("content")
            .or_else(|| message.get("text"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    (!text.trim().is_empty()).then(|| text.to_string())
}

/// The fixed post-processing applied to every reply before it is spoken.
#[derive(Debug, Clone)]
pub struct ReplyPolicy {
    markers: Vec<String>,
    brand: Option<(Regex, String)>,
}

impl ReplyPolicy {
    pub fn new(config: &ReplyConfig) -> Result<Self, ChatError> {
        let brand = config
            .brand
            .as_ref()
            .filter(|b| !b.pattern.is_empty())
            .map(|BrandRename { pattern, replacement }| {
                RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
                    .map(|re| (re, replacement.clone()))
                    .map_err(|e| ChatError::Config(format!("brand pattern: {e}")))
            })
            .transpose()?;

        Ok(Self {
            markers: config
                .markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
            brand,
        })
    }

    /// Cuts the reply to what follows the first matching section marker,
    /// drops the marker's trailing colon, and applies the brand rename.
    pub fn apply(&self, raw: &str) -> String {
        let text = self
            .markers
            .iter()
            .find_map(|marker| raw.split_once(marker.as_str()))
            .map_or(raw, |(_, rest)| rest)
            .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
            .trim_end();

        match &self.brand {
            Some((re, replacement)) => re
                .replace_all(text, regex::NoExpand(replacement.as_str()))
                .into_owned(),
            None => text.to_string(),
        }
    }
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        // The default configuration always compiles.
        Self::new(&ReplyConfig::default()).unwrap_or(Self {
            markers: Vec::new(),
            brand: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_text_is_preferred() {
        let body = json!({ "summary": { "text": "from summary" }, "messages": ["from messages"] });
        assert_eq!(extract_reply(&body).as_deref(), Some("from summary"));
    }

    #[test]
    fn falls_back_to_first_message() {
        let body = json!({ "messages": ["first", "second"] });
        assert_eq!(extract_reply(&body).as_deref(), Some("first"));

        let body = json!({ "summary": { "text": "" }, "messages": ["fallback"] });
        assert_eq!(extract_reply(&body).as_deref(), Some("fallback"));

        let body = json!({ "messages": [{ "role": "assistant", "content": "structured" }] });
        assert_eq!(extract_reply(&body).as_deref(), Some("structured"));
    }

    #[test]
    fn missing_or_empty_shapes_yield_nothing() {
        assert_eq!(extract_reply(&json!({})), None);
        assert_eq!(extract_reply(&json!({ "messages": [] })), None);
        assert_eq!(extract_reply(&json!({ "summary": {} })), None);
        assert_eq!(extract_reply(&json!({ "messages": [42] })), None);
    }

    #[test]
    fn conclusion_marker_and_colon_are_removed() {
        let policy = ReplyPolicy::default();
        assert_eq!(policy.apply("Conclusion: X"), "X");
    }

    #[test]
    fn summary_marker_wins_over_conclusion() {
        let policy = ReplyPolicy::default();
        let raw = "Analysis first. Conclusion: ignored. Summary: Stocks rallied.";
        assert_eq!(policy.apply(raw), "Stocks rallied.");
    }

    #[test]
    fn everything_after_the_marker_is_kept() {
        let policy = ReplyPolicy::default();
        let raw = "Intro\nSummary:\nOil fell. Gold rose.\n";
        assert_eq!(policy.apply(raw), "Oil fell. Gold rose.");
    }

    #[test]
    fn repeated_marker_keeps_text_after_first_occurrence() {
        let policy = ReplyPolicy::default();
        let raw = "Summary: Stocks rose. Summary of risks: rates.";
        assert_eq!(policy.apply(raw), "Stocks rose. Summary of risks: rates.");
    }

    #[test]
    fn text_without_markers_is_only_trimmed() {
        let policy = ReplyPolicy::default();
        assert_eq!(policy.apply("  Plain answer.  "), "Plain answer.");
    }

    #[test]
    fn brand_is_renamed_case_insensitively() {
        let policy = ReplyPolicy::default();
        assert_eq!(
            policy.apply("Yukka and YUKKA and yukka"),
            "YUUKA and YUUKA and YUUKA"
        );
    }

    #[test]
    fn brand_pattern_is_literal() {
        let policy = ReplyPolicy::new(&ReplyConfig {
            markers: Vec::new(),
            brand: Some(BrandRename {
                pattern: "a.b".to_string(),
                replacement: "$0".to_string(),
            }),
        })
        .expect("should compile");
        assert_eq!(policy.apply("axb A.B"), "axb $0");
    }

    #[test]
    fn marker_only_reply_becomes_empty() {
        let policy = ReplyPolicy::default();
        assert_eq!(policy.apply("Summary:"), "");
    }
}
