use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// How many characters of the raw reply an error record keeps.
const RAW_PREFIX_CHARS: usize = 200;

const TAGGED_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Where in the reply the JSON candidate was taken from, in priority
/// order: a ```json fence wins over a plain ``` fence, which wins over
/// the whole reply. Exactly one candidate is tried; a parse failure on
/// a fenced candidate does not fall through to the next source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    TaggedFence,
    BareFence,
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    JsonParse,
}

impl ExtractErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractErrorKind::JsonParse => "json_parse_error",
        }
    }
}

/// A reply whose selected candidate was not valid JSON. Keeps the start
/// of the raw reply (not the candidate) so callers can see what the
/// model actually said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model reply was not valid JSON")]
pub struct ExtractError {
    pub kind: ExtractErrorKind,
    pub raw_prefix: String,
}

impl ExtractError {
    fn new(kind: ExtractErrorKind, raw: &str) -> Self {
        Self {
            kind,
            raw_prefix: raw.chars().take(RAW_PREFIX_CHARS).collect(),
        }
    }

    /// The structured error record callers embed in place of findings.
    pub fn into_value(self) -> Value {
        json!({
            "error": self.kind.as_str(),
            "raw_response": self.raw_prefix,
        })
    }
}

/// Pick the JSON candidate out of a model reply.
///
/// Mirrors how chat models wrap structured output: the content of the
/// first ```json fence if present, otherwise the content of the first
/// plain ``` fence, otherwise the reply itself. An unterminated fence
/// runs to the end of the reply.
pub fn select_candidate(text: &str) -> (CandidateSource, &str) {
    if let Some(start) = text.find(TAGGED_FENCE) {
        let rest = &text[start + TAGGED_FENCE.len()..];
        let end = rest.find(FENCE).unwrap_or(rest.len());
        return (CandidateSource::TaggedFence, &rest[..end]);
    }
    if let Some(start) = text.find(FENCE) {
        let rest = &text[start + FENCE.len()..];
        let end = rest.find(FENCE).unwrap_or(rest.len());
        return (CandidateSource::BareFence, &rest[..end]);
    }
    (CandidateSource::Raw, text)
}

/// Extract the JSON candidate from a reply and parse it.
pub fn extract_and_parse(raw: &str) -> Result<Value, ExtractError> {
    let (source, candidate) = select_candidate(raw);
    serde_json::from_str(candidate.trim()).map_err(|err| {
        debug!("candidate from {:?} failed to parse: {}", source, err);
        ExtractError::new(ExtractErrorKind::JsonParse, raw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_tagged_fence_wins() {
        let reply = "Here is my analysis:\n```json\n{\"bugs\": []}\n```\nHope that helps!";
        let parsed = extract_and_parse(reply).unwrap();
        assert_eq!(parsed, json!({"bugs": []}));
    }

    #[test]
    fn test_bare_fence_used_when_no_tagged_fence() {
        let reply = "Sure:\n```\n{\"optimizations\": [1, 2]}\n```";
        let (source, _) = select_candidate(reply);
        assert_eq!(source, CandidateSource::BareFence);
        let parsed = extract_and_parse(reply).unwrap();
        assert_eq!(parsed, json!({"optimizations": [1, 2]}));
    }

    #[test]
    fn test_raw_reply_parsed_when_unfenced() {
        let reply = "  {\"summary\": \"fine\"}  ";
        let (source, _) = select_candidate(reply);
        assert_eq!(source, CandidateSource::Raw);
        assert_eq!(extract_and_parse(reply).unwrap(), json!({"summary": "fine"}));
    }

    #[test]
    fn test_unterminated_tagged_fence_runs_to_end() {
        let reply = "```json\n{\"bugs\": [{\"line\": 3}]}";
        assert_eq!(
            extract_and_parse(reply).unwrap(),
            json!({"bugs": [{"line": 3}]})
        );
    }

    #[test]
    fn test_tagged_fence_beats_later_bare_fence_even_when_invalid() {
        // Exactly one candidate is tried. A broken ```json fence is a
        // parse error even if a later plain fence holds valid JSON.
        let reply = "```json\nnot json\n```\n```\n{\"bugs\": []}\n```";
        let (source, _) = select_candidate(reply);
        assert_eq!(source, CandidateSource::TaggedFence);
        let err = extract_and_parse(reply).unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::JsonParse);
    }

    #[test]
    fn test_parse_failure_yields_error_record() {
        let reply = "I think the code looks good overall.";
        let err = extract_and_parse(reply).unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::JsonParse);
        assert_eq!(err.raw_prefix, reply);

        let record = err.into_value();
        assert_eq!(record["error"], "json_parse_error");
        assert_eq!(record["raw_response"], reply);
    }

    #[test]
    fn test_error_record_keeps_raw_reply_not_candidate() {
        let reply = "Preamble before the fence.\n```json\nbroken\n```";
        let err = extract_and_parse(reply).unwrap_err();
        assert!(err.raw_prefix.starts_with("Preamble before the fence."));
    }

    #[test]
    fn test_raw_prefix_truncates_at_200_chars() {
        let reply: String = "x".repeat(300);
        let err = extract_and_parse(&reply).unwrap_err();
        assert_eq!(err.raw_prefix.chars().count(), 200);
    }

    #[test]
    fn test_raw_prefix_counts_chars_not_bytes() {
        let reply: String = "é".repeat(250);
        let err = extract_and_parse(&reply).unwrap_err();
        assert_eq!(err.raw_prefix.chars().count(), 200);
        assert_eq!(err.raw_prefix.len(), 400);
    }

    #[test]
    fn test_empty_reply_is_parse_error() {
        let err = extract_and_parse("").unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::JsonParse);
        assert_eq!(err.raw_prefix, "");
    }

    proptest! {
        #[test]
        fn prop_extract_never_panics_and_is_deterministic(reply in ".{0,400}") {
            let first = extract_and_parse(&reply);
            let second = extract_and_parse(&reply);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_error_prefix_bounded(reply in ".{0,400}") {
            if let Err(err) = extract_and_parse(&reply) {
                prop_assert!(err.raw_prefix.chars().count() <= 200);
            }
        }
    }
}
