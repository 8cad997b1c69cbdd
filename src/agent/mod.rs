//! Agent module - orchestration and conversation state
//!
//! Contains the agent that runs one exchange at a time and the session that
//! owns the transcript.

pub mod orchestrator;
pub mod session;
pub mod turn_state;

pub use orchestrator::{Agent, EMPTY_REPLY};
pub use session::{Role, Session, Transcript, Turn};
pub use turn_state::{AgentState, Invocation, TurnState};
