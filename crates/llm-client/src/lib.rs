//! LLM client abstraction used for post-routing synthesis (EXPLAIN, COMPARE,
//! RECOMMEND, FAQ answers). The router itself never depends on this crate —
//! `router-core` produces a `RoutingDecision` and stops; `router-web` calls
//! an `LlmClient` afterward to turn that decision into prose.

pub mod anthropic;
pub mod openai;

use async_trait::async_trait;

/// A tool/function definition offered to the model for structured output.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The result of a tool-call-constrained completion.
#[derive(Debug, Clone)]
pub struct ToolCallResult {
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Plain chat completion.
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;

    /// Chat completion constrained to return a JSON object.
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;

    /// Chat completion constrained to call the given tool.
    async fn chat_with_tool(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tool: &ToolDefinition,
    ) -> anyhow::Result<ToolCallResult>;

    fn model_name(&self) -> &str;
    fn provider_name(&self) -> &str;
}
