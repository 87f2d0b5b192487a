use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::{Tool, ToolCall};
use crate::models::transcript::Transcript;
use crate::prompt_template::load_prompt_file;
use crate::providers::base::Provider;
use crate::systems::System;

/// The exact phrase the model is instructed to emit when a request must be
/// handed to a human supervisor. Callers match on it to surface escalations.
pub const ESCALATION_PHRASE: &str = "This task requires supervisor attention.";

const FALLBACK_REPLY: &str = "I couldn't process that request fully. Could you please rephrase?";
const MODEL_FAILURE_REPLY: &str =
    "An internal error occurred. Please try again later or contact support.";

/// Runtime settings for the agent that come from the environment rather
/// than from the model or the user.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Mailbox the agent sends from and falls back to when no user is named
    pub mailbox: String,
    /// Where escalated requests are routed
    pub supervisor_email: String,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            mailbox: std::env::var("AGENT_MAILBOX")
                .unwrap_or_else(|_| "ai_agent_dev2@intellistrata.com.au".to_string()),
            supervisor_email: std::env::var("SUPERVISOR_EMAIL")
                .unwrap_or_else(|_| "default_supervisor@example.com".to_string()),
        }
    }
}

/// Agent talking to a language model and dispatching its tool calls.
///
/// Each user turn makes at most two model calls: one to decide, then one
/// more to phrase the results if any tools ran. Conversation state lives in
/// the caller-owned [`Transcript`], not in the agent.
pub struct Agent {
    provider: Box<dyn Provider>,
    systems: Vec<Box<dyn System>>,
    system_prompt: String,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, config: &AgentConfig) -> Result<Self> {
        let mut context = HashMap::new();
        context.insert("mailbox".to_string(), config.mailbox.clone());
        context.insert(
            "supervisor_email".to_string(),
            config.supervisor_email.clone(),
        );
        let system_prompt = load_prompt_file("system.md", &context)?;

        Ok(Self {
            provider,
            systems: Vec::new(),
            system_prompt,
        })
    }

    /// Add a system to the agent
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// Start a fresh conversation seeded with the rendered instructions
    pub fn new_transcript(&self) -> Transcript {
        Transcript::new(&self.system_prompt)
    }

    /// All tools across every registered system, in registration order
    fn tools(&self) -> Vec<Tool> {
        self.systems
            .iter()
            .flat_map(|system| system.tools().iter().cloned())
            .collect()
    }

    /// Find the system that owns a tool
    fn system_for_tool(&self, name: &str) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|system| system.tools().iter().any(|tool| tool.name == name))
            .map(|system| system.as_ref())
    }

    /// Route a single tool call to its owning system. Malformed requests
    /// pass their error straight through; an unrecognized name becomes a
    /// ToolNotFound so the model hears about it on the next call.
    async fn dispatch_tool_call(&self, tool_call: AgentResult<ToolCall>) -> AgentResult<Value> {
        let call = tool_call?;
        let system = self
            .system_for_tool(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;
        system.call(call).await
    }

    /// Handle one user turn end to end and return the agent's answer.
    ///
    /// The user message and everything the model produced are appended to
    /// the transcript even when a model call fails, so the next turn sees
    /// the full history.
    pub async fn process_message(&self, transcript: &mut Transcript, user_message: &str) -> String {
        transcript.push(Message::user().with_text(user_message));
        match self.reply(transcript).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "model call failed");
                MODEL_FAILURE_REPLY.to_string()
            }
        }
    }

    async fn reply(&self, transcript: &mut Transcript) -> Result<String> {
        let tools = self.tools();

        let (response, usage) = self.provider.complete(transcript.messages(), &tools).await?;
        tracing::debug!(input_tokens = ?usage.input_tokens, output_tokens = ?usage.output_tokens, "model response");
        transcript.push(response.clone());

        let requests: Vec<ToolRequest> = response
            .tool_requests()
            .into_iter()
            .cloned()
            .collect();
        if requests.is_empty() {
            let text = response.text();
            if text.is_empty() {
                return Ok(FALLBACK_REPLY.to_string());
            }
            return Ok(text);
        }

        // One at a time, in the order the model asked for them. A later call
        // may depend on Graph state a prior one changed.
        let mut results = Message::user();
        for request in &requests {
            let outcome = self.dispatch_tool_call(request.tool_call.clone()).await;
            match (&request.tool_call, &outcome) {
                (Ok(call), Err(e)) => {
                    tracing::warn!(tool = %call.name, error = %e, "tool call failed")
                }
                (Ok(call), Ok(_)) => tracing::info!(tool = %call.name, "tool call completed"),
                (Err(e), _) => tracing::warn!(error = %e, "malformed tool request"),
            }
            results = results.with_tool_response(request.id.clone(), outcome);
        }
        transcript.push(results);

        let (final_message, _usage) = self.provider.complete(transcript.messages(), &tools).await?;
        transcript.push(final_message.clone());

        // The fallback only covers a first reply carrying nothing at all;
        // after a tool round the model's wording stands as-is
        Ok(final_message.text())
    }
}
