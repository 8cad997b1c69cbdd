//! Agent orchestrator
//!
//! Coordinates the model, the tool registry, and a session's transcript for
//! one exchange at a time. The model may call tools any number of rounds
//! (up to a limit) before it answers.

use std::sync::Arc;

use crate::agent::session::Session;
use crate::agent::turn_state::{AgentState, Invocation, TurnState};
use crate::core::{CityTimeError, Config, Message, Result};
use crate::llm::{GeminiClient, GenerateOptions, LLMProvider};
use crate::time::{resolver_from_config, TimeLookup, TimeResolver};
use crate::tools::{CurrentTimeTool, ToolRegistry};

/// Reply used when the model answers with nothing
pub const EMPTY_REPLY: &str = "I apologize, but I couldn't generate a response.";

/// Main agent that orchestrates LLM and tools
pub struct Agent {
    /// Configuration
    config: Config,
    /// LLM backend
    llm: Arc<dyn LLMProvider>,
    /// Time source behind the tool, also used for direct lookups
    resolver: Arc<dyn TimeResolver>,
    /// Tools offered to the model
    tools: ToolRegistry,
    /// Current position in the turn state machine
    state: AgentState,
    /// Tool activity of the most recent turn
    last_turn: Option<TurnState>,
}

impl Agent {
    /// Create an agent talking to Gemini.
    ///
    /// Fails with [`CityTimeError::MissingCredential`] when no API key is
    /// configured; no session should start in that case.
    pub fn with_config(config: Config) -> Result<Self> {
        let llm = Arc::new(GeminiClient::from_config(&config)?);
        let resolver = resolver_from_config(&config);
        Ok(Self::from_parts(config, llm, resolver))
    }

    /// Create an agent from explicit collaborators
    pub fn from_parts(
        config: Config,
        llm: Arc<dyn LLMProvider>,
        resolver: Arc<dyn TimeResolver>,
    ) -> Self {
        let tools =
            ToolRegistry::new().with_tool(Arc::new(CurrentTimeTool::new(Arc::clone(&resolver))));

        Self {
            config,
            llm,
            resolver,
            tools,
            state: AgentState::Idle,
            last_turn: None,
        }
    }

    /// Process one user message against `session`.
    ///
    /// On success the user message and the reply are appended to the
    /// transcript together. On failure the transcript is left exactly as it
    /// was and the error is returned for display.
    pub async fn process_turn(&mut self, session: &mut Session, user_input: &str) -> Result<String> {
        let user_input = user_input.trim();
        if user_input.is_empty() {
            return Err(CityTimeError::Other("Nothing to send".to_string()));
        }

        let mut turn = TurnState::new(self.config.agent.max_tool_rounds);
        let result = self.run_turn(session, user_input, &mut turn).await;
        self.last_turn = Some(turn);
        self.state = AgentState::Idle;

        match result {
            Ok(reply) => {
                session.record_exchange(user_input, &reply);
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "turn failed; transcript unchanged");
                Err(e)
            }
        }
    }

    async fn run_turn(
        &mut self,
        session: &Session,
        user_input: &str,
        turn: &mut TurnState,
    ) -> Result<String> {
        let mut messages = vec![Message::system(&self.config.agent.system_instruction)];
        messages.extend(
            session
                .transcript()
                .context_messages(self.config.agent.context_window),
        );
        messages.push(Message::user(user_input));

        let tool_defs = self.tools.definitions();
        let options = GenerateOptions {
            temperature: self.config.llm.temperature,
            ..Default::default()
        };

        self.state = AgentState::ToolInvocationPending;

        loop {
            tracing::debug!(
                round = turn.round,
                messages = messages.len(),
                tools = tool_defs.len(),
                "calling {}",
                self.llm.name()
            );

            let response = self
                .llm
                .chat_with_tools(
                    &self.config.llm.model,
                    &messages,
                    &tool_defs,
                    Some(options.clone()),
                )
                .await?;

            if response.tool_calls.is_empty() {
                self.state = AgentState::ComposingReply;
                let reply = response.content.trim();
                return Ok(if reply.is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    reply.to_string()
                });
            }

            if !turn.can_call_tools() {
                return Err(CityTimeError::ToolLoop(turn.max_rounds));
            }

            messages.push(Message::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            // One call at a time; each result is in context before the next round
            for call in &response.tool_calls {
                let result = self.tools.execute(call).await;
                turn.record(call, &result);
                messages.push(result.to_message());
            }

            turn.next_round();
        }
    }

    /// Call the resolver directly, bypassing the model
    pub async fn lookup(&self, timezone: &str) -> TimeLookup {
        self.resolver.resolve(timezone).await
    }

    /// Mark the agent as waiting for the next user message
    pub fn await_input(&mut self) {
        self.state = AgentState::AwaitingUserInput;
    }

    /// Current state machine position
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Tool calls made during the most recent turn
    pub fn last_invocations(&self) -> &[Invocation] {
        self.last_turn
            .as_ref()
            .map(|t| t.invocations.as_slice())
            .unwrap_or(&[])
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the system instruction
    pub fn set_system_instruction(&mut self, instruction: impl Into<String>) {
        self.config.agent.system_instruction = instruction.into();
    }

    /// Enable debug mode
    pub fn set_debug(&mut self, debug: bool) {
        self.config.agent.debug = debug;
    }

    /// Name of the LLM backend
    pub fn backend_name(&self) -> &str {
        self.llm.name()
    }

    /// Name of the time source
    pub fn resolver_name(&self) -> &str {
        self.resolver.name()
    }

    /// Tools offered to the model
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}
