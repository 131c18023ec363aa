pub mod api_types;
pub mod explain;
pub mod fallback;
pub mod llm;
pub mod prompts;
pub mod providers;

pub use explain::{
    join_explanation, Explanation, ExplanationEngine, ExplanationSource, PendingExplanation,
};
pub use fallback::explain_fallback;
pub use llm::{CompletionParams, LlmClient};
pub use providers::LlmProvider;
