//! Trait analysis
//!
//! Builds the analysis prompt, sends it to a `CompletionProvider` and turns
//! the model's free-form answer into validated `TraitScores`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::llm_client::CompletionProvider;
use crate::prompts::build_analysis_prompt;

/// Trait keys every analysis must carry, in validation order
pub const REQUIRED_TRAITS: [&str; 6] = ["他責志向", "誠実性", "協調性", "柔軟性", "学習意欲", "楽観性"];

/// First `{` up to the first following `}`.
///
/// Nested objects get truncated at the inner `}` and then fail to parse.
/// Models answer with a flat object here, so this is kept as is.
static JSON_OBJECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*?\}").expect("valid JSON object pattern"));

/// Six personality trait scores.
///
/// Scores are kept as `serde_json::Number`, so integers stay integers and
/// nothing is clamped or rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitScores {
    #[serde(rename = "他責志向")]
    pub other_blaming: Number,
    #[serde(rename = "誠実性")]
    pub integrity: Number,
    #[serde(rename = "協調性")]
    pub cooperativeness: Number,
    #[serde(rename = "柔軟性")]
    pub flexibility: Number,
    #[serde(rename = "学習意欲")]
    pub eagerness_to_learn: Number,
    #[serde(rename = "楽観性")]
    pub optimism: Number,
}

impl TraitScores {
    /// Validate any parsed JSON value; non-objects are a parse failure
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(AnalysisError::NoJsonObject {
                raw: value.to_string(),
            });
        };
        Self::from_object(&object)
    }

    /// Validate a parsed object, failing on the first missing or non-numeric key
    pub fn from_object(object: &Map<String, Value>) -> Result<Self> {
        let [other_blaming, integrity, cooperativeness, flexibility, eagerness_to_learn, optimism] =
            REQUIRED_TRAITS;

        Ok(Self {
            other_blaming: score(object, other_blaming)?,
            integrity: score(object, integrity)?,
            cooperativeness: score(object, cooperativeness)?,
            flexibility: score(object, flexibility)?,
            eagerness_to_learn: score(object, eagerness_to_learn)?,
            optimism: score(object, optimism)?,
        })
    }
}

fn score(object: &Map<String, Value>, key: &'static str) -> Result<Number> {
    match object.get(key) {
        Some(Value::Number(n)) => Ok(n.clone()),
        _ => Err(AnalysisError::MissingTrait(key)),
    }
}

/// Locate the first brace-delimited candidate in model output
pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT_PATTERN.find(text).map(|m| m.as_str())
}

/// Parse model output into trait scores.
///
/// Surrounding prose and code fences are discarded.
pub fn parse_trait_scores(output: &str) -> Result<TraitScores> {
    let output = trim_text(output);
    let candidate = extract_json_object(output).ok_or_else(|| AnalysisError::NoJsonObject {
        raw: output.to_string(),
    })?;

    debug!("Extracted JSON candidate: {}", candidate);

    let value: Value = serde_json::from_str(candidate)?;
    TraitScores::from_value(value)
}

/// Trim like JS `String.prototype.trim`, which also strips U+FEFF
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Runs one analysis per call against the configured provider
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn CompletionProvider>,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn analyze(&self, text: &str) -> Result<TraitScores> {
        if trim_text(text).is_empty() {
            return Err(AnalysisError::MissingText);
        }

        let prompt = build_analysis_prompt(text);
        let output = self.provider.complete(&prompt).await?;
        parse_trait_scores(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const FULL_OUTPUT: &str = r#"{"他責志向":1,"誠実性":2,"協調性":3,"柔軟性":4,"学習意欲":5,"楽観性":6}"#;

    /// Records prompts and answers with a canned reply
    struct StubProvider {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: AnalysisError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(AnalysisError::Upstream { status, body }) => Err(AnalysisError::Upstream {
                    status: *status,
                    body: body.clone(),
                }),
                Err(_) => Err(AnalysisError::EmptyContent),
            }
        }
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(
            extract_json_object("Here you go: {\"a\": 1} Thanks!"),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_json_object("no braces here"), None);
    }

    #[test]
    fn test_extract_json_object_from_code_fence() {
        let output = "```json\n{\n  \"a\": 1,\n  \"b\": 2\n}\n```";
        assert_eq!(
            extract_json_object(output),
            Some("{\n  \"a\": 1,\n  \"b\": 2\n}")
        );
    }

    #[test]
    fn test_extract_json_object_stops_at_first_close() {
        assert_eq!(
            extract_json_object("{\"outer\": {\"inner\": 1}}"),
            Some("{\"outer\": {\"inner\": 1}")
        );
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let output = format!("Here you go: {} Thanks!", FULL_OUTPUT);
        let scores = parse_trait_scores(&output).unwrap();

        let value = serde_json::to_value(&scores).unwrap();
        assert_eq!(
            value,
            json!({"他責志向": 1, "誠実性": 2, "協調性": 3, "柔軟性": 4, "学習意欲": 5, "楽観性": 6})
        );
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    // Values are preserved, not their spelling: without `arbitrary_precision`
    // `1e2` goes back out as `100.0`.
    #[test]
    fn test_parse_keeps_numeric_values() {
        let output = r#"{"他責志向":-3,"誠実性":72.5,"協調性":150,"柔軟性":0,"学習意欲":1e2,"楽観性":99}"#;
        let scores = parse_trait_scores(output).unwrap();

        assert_eq!(scores.other_blaming.as_i64(), Some(-3));
        assert_eq!(scores.integrity.as_f64(), Some(72.5));
        assert_eq!(scores.cooperativeness.as_u64(), Some(150));
        assert_eq!(scores.eagerness_to_learn.as_f64(), Some(100.0));
        assert_eq!(serde_json::to_string(&scores.cooperativeness).unwrap(), "150");
    }

    #[test]
    fn test_non_object_value_is_parse_error() {
        let err = TraitScores::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, AnalysisError::NoJsonObject { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn test_trim_text_strips_bom() {
        assert_eq!(trim_text("\u{feff} hi \u{feff}\n"), "hi");
        assert_eq!(trim_text("\u{feff}\u{3000}"), "");
    }

    #[test]
    fn test_parse_drops_extra_keys() {
        let output = r#"{"他責志向":1,"誠実性":2,"協調性":3,"柔軟性":4,"学習意欲":5,"楽観性":6,"comment":7}"#;
        let value = serde_json::to_value(parse_trait_scores(output).unwrap()).unwrap();
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn test_parse_no_json() {
        let err = parse_trait_scores("I cannot analyze this text.").unwrap_err();
        match err {
            AnalysisError::NoJsonObject { raw } => assert_eq!(raw, "I cannot analyze this text."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_trait_scores("{他責志向: one}").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_missing_key_names_it() {
        let output = r#"{"他責志向":1,"誠実性":2,"協調性":3,"柔軟性":4,"楽観性":6}"#;
        let err = parse_trait_scores(output).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingTrait("学習意欲")));
        assert!(err.to_string().contains("学習意欲"));
    }

    #[test]
    fn test_parse_non_numeric_value() {
        let output = r#"{"他責志向":"high","誠実性":2,"協調性":3,"柔軟性":4,"学習意欲":5,"楽観性":6}"#;
        let err = parse_trait_scores(output).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingTrait("他責志向")));
    }

    #[test]
    fn test_parse_reports_first_offender() {
        let err = parse_trait_scores(r#"{"誠実性":2}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingTrait("他責志向")));
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_text_without_calling() {
        let provider = StubProvider::replying(FULL_OUTPUT);
        let analyzer = Analyzer::new(provider.clone());

        for text in ["", "   ", "\n\t  ", "\u{feff}", " \u{feff}\u{3000} "] {
            let err = analyzer.analyze(text).await.unwrap_err();
            assert!(matches!(err, AnalysisError::MissingText));
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_calls_once_with_literal_text() {
        let provider = StubProvider::replying(FULL_OUTPUT);
        let analyzer = Analyzer::new(provider.clone());

        let scores = analyzer.analyze("  毎日コードを書いています。 ").await.unwrap();
        assert_eq!(scores.optimism.as_u64(), Some(6));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("  毎日コードを書いています。 "));
    }

    #[tokio::test]
    async fn test_analyze_propagates_upstream_error() {
        let provider = StubProvider::failing(AnalysisError::Upstream {
            status: 529,
            body: "overloaded".to_string(),
        });
        let analyzer = Analyzer::new(provider.clone());

        let err = analyzer.analyze("some text").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Upstream { status: 529, .. }));
        assert_eq!(provider.calls().len(), 1);
    }
}
