pub mod gemini;
pub mod json;
pub mod prompt;

/// Single-turn text completion. Returns the model's raw text; interpreting it
/// (including all degradation) is [`json::parse_verdict`]'s job.
#[async_trait::async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
