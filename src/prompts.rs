//! Prompt templates
//!
//! Holds the fixed analysis template sent to the provider and the preset
//! prompts exposed by `GET /api/prompts/list`. Presets are compiled in, or
//! loaded once from a TOML file at startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder replaced by the caller's text
pub const TEXT_PLACEHOLDER: &str = "{TEXT}";

/// Template for the trait analysis request.
///
/// The key names must match `analysis::REQUIRED_TRAITS`.
pub const ANALYSIS_PROMPT: &str = r#"You are an organizational psychologist. Read the text below, written by one person, and rate the writer on six traits.

Score every trait as a number from 0 to 100:
- 他責志向: tendency to blame others or circumstances for problems
- 誠実性: integrity and honesty
- 協調性: cooperativeness with others
- 柔軟性: flexibility when plans or opinions change
- 学習意欲: eagerness to learn
- 楽観性: optimism

TEXT:
{TEXT}

RESPONSE FORMAT (JSON only, no other text):
{"他責志向": 0, "誠実性": 0, "協調性": 0, "柔軟性": 0, "学習意欲": 0, "楽観性": 0}"#;

/// Substitute the caller's text into the analysis template.
///
/// Only the first placeholder is replaced, and the text is inserted as sent.
pub fn build_analysis_prompt(text: &str) -> String {
    ANALYSIS_PROMPT.replacen(TEXT_PLACEHOLDER, text, 1)
}

/// A named, pre-authored prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPreset {
    pub name: String,
    pub template: String,
}

impl PromptPreset {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
        }
    }
}

/// Read-only list of presets, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCatalog {
    pub prompts: Vec<PromptPreset>,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::new(vec![
            PromptPreset::new(
                "自己紹介",
                "Introduce yourself: your background, what you are working on now, and what you want to do next.",
            ),
            PromptPreset::new(
                "失敗談",
                "Describe a project that did not go as planned. What happened, and what would you do differently?",
            ),
            PromptPreset::new(
                "チームでの経験",
                "Describe a time you disagreed with a teammate. How did you handle it and how did it end?",
            ),
            PromptPreset::new(
                "学び",
                "What is something you learned recently, and why did you decide to learn it?",
            ),
            PromptPreset::new(
                "将来の展望",
                "Where do you see yourself in five years, and what might get in the way?",
            ),
        ])
    }
}

impl PromptCatalog {
    pub fn new(prompts: Vec<PromptPreset>) -> Self {
        Self { prompts }
    }

    /// Load presets from a TOML file with `[[prompts]]` tables
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompts file {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Invalid prompts file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let catalog: PromptCatalog = toml::from_str(raw).context("Failed to parse prompts TOML")?;
        if catalog.prompts.is_empty() {
            anyhow::bail!("Prompts file defines no presets");
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
