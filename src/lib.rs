//! Trait Analyzer
//!
//! Sends free text to an LLM provider, asks for a six-trait personality
//! analysis and validates the scores before handing them back over HTTP.
//!
//! ## Module Structure
//!
//! - `analysis`: prompt -> provider -> validated `TraitScores`
//! - `llm_client`: Anthropic Messages API client
//! - `prompts`: analysis template and preset catalog
//! - `error`: error taxonomy and HTTP mapping
//! - `server`: axum router and handlers

pub mod analysis;
pub mod error;
pub mod llm_client;
pub mod prompts;
pub mod server;

pub use analysis::{parse_trait_scores, Analyzer, TraitScores, REQUIRED_TRAITS};
pub use error::{AnalysisError, ErrorKind};
pub use llm_client::{AnthropicClient, CompletionProvider, LlmConfig};
pub use prompts::{PromptCatalog, PromptPreset};
pub use server::{router, run_server, AppState};
