//! citytime - ask what time it is anywhere
//!
//! A conversational front-end that hands timezone extraction and phrasing to
//! Gemini, which answers by calling one deterministic tool,
//! `get_current_time`.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Time**: Timezone resolvers (local tz database or remote service)
//! - **Tools**: Tool trait, registry, and the time lookup tool
//! - **LLM**: Provider abstraction with the Gemini implementation
//! - **Agent**: Turn orchestration and the session transcript
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use citytime::{Agent, Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> citytime::Result<()> {
//!     let mut agent = Agent::with_config(Config::load())?;
//!     let mut session = Session::new();
//!
//!     let reply = agent.process_turn(&mut session, "What time is it in Dubai?").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod time;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, Session};
pub use cli::Repl;
pub use core::{CityTimeError, Config, Result};
