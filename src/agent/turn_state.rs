//! Turn state management
//!
//! Tracks where the agent is in an exchange and which tools the model
//! invoked along the way.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{ToolCall, ToolResult};

/// Where the agent is in the per-turn state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentState {
    #[default]
    Idle,
    /// The UI is waiting for the next user message
    AwaitingUserInput,
    /// The model is being consulted and may call tools
    ToolInvocationPending,
    /// The model returned its final text
    ComposingReply,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Idle => write!(f, "idle"),
            AgentState::AwaitingUserInput => write!(f, "awaiting input"),
            AgentState::ToolInvocationPending => write!(f, "tool invocation pending"),
            AgentState::ComposingReply => write!(f, "composing reply"),
        }
    }
}

/// State of one user turn
#[derive(Debug, Clone)]
pub struct TurnState {
    /// Tool rounds completed so far
    pub round: usize,
    /// Maximum tool rounds before the turn is abandoned
    pub max_rounds: usize,
    /// Every tool call made during this turn, in order
    pub invocations: Vec<Invocation>,
}

impl TurnState {
    pub fn new(max_rounds: usize) -> Self {
        Self {
            round: 0,
            max_rounds,
            invocations: Vec::new(),
        }
    }

    /// Whether the model may run another round of tools
    pub fn can_call_tools(&self) -> bool {
        self.round < self.max_rounds
    }

    pub fn record(&mut self, call: &ToolCall, result: &ToolResult) {
        self.invocations.push(Invocation::new(call, result));
    }

    pub fn next_round(&mut self) {
        self.round += 1;
    }
}

/// A tool invocation and its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub success: bool,
    /// Human-readable summary of the result
    pub output: String,
}

impl Invocation {
    fn new(call: &ToolCall, result: &ToolResult) -> Self {
        Self {
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
            success: result.success,
            output: result.output.clone(),
        }
    }
}
