//! CLI commands
//!
//! Special commands that can be executed in the REPL. Anything that is not a
//! command is a message for the assistant.

use crate::agent::{Agent, Role, Session};
use crate::core::{ResponseStyle, Result};

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Send the input to the assistant
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Discard the session and start a fresh one
    Reset,
}

/// Parse and handle special commands
pub async fn handle_command(
    input: &str,
    agent: &mut Agent,
    session: &Session,
) -> Result<CommandResult> {
    let input = input.trim();
    let (cmd, args) = match input.split_once(' ') {
        Some((cmd, args)) => (cmd.to_lowercase(), args.trim()),
        None => (input.to_lowercase(), ""),
    };
    let cmd = cmd.trim_start_matches('/');

    match cmd {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "reset" | "clear" => Ok(CommandResult::Reset),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "history" => Ok(CommandResult::Handled(render_history(session))),

        "time" if !args.is_empty() => {
            let lookup = agent.lookup(args).await;
            let raw = serde_json::to_string_pretty(&lookup)?;
            Ok(CommandResult::Handled(raw))
        }

        "style" => {
            if args.is_empty() {
                return Ok(CommandResult::Handled(format!(
                    "Current instruction:\n  {}\nUsage: style <raw|conversational>",
                    agent.config().agent.system_instruction
                )));
            }
            match args.parse::<ResponseStyle>() {
                Ok(style) => {
                    agent.set_system_instruction(style.instruction());
                    Ok(CommandResult::Handled(format!("Response style set to: {}", style)))
                }
                Err(e) => Ok(CommandResult::Handled(e)),
            }
        }

        "status" => {
            let config = agent.config();
            let status = format!(
                "citytime Status:\n\
                 ─────────────────────────────\n\
                 Backend:      {} ({})\n\
                 Time source:  {}\n\
                 Tools:        {}\n\
                 State:        {}\n\
                 History:      {} turns\n\
                 Debug:        {}",
                agent.backend_name(),
                config.llm.model,
                agent.resolver_name(),
                agent.tools().names().join(", "),
                agent.state(),
                session.len(),
                if config.agent.debug { "on" } else { "off" }
            );
            Ok(CommandResult::Handled(status))
        }

        "debug" => {
            let new_state = !agent.config().agent.debug;
            agent.set_debug(new_state);
            Ok(CommandResult::Handled(format!(
                "Debug mode: {}",
                if new_state { "ON" } else { "OFF" }
            )))
        }

        _ => {
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Replay the transcript in order
pub fn render_history(session: &Session) -> String {
    if session.is_empty() {
        return "No messages yet.".to_string();
    }

    session
        .transcript()
        .iter()
        .map(|turn| {
            let label = match turn.role() {
                Role::User => "You",
                Role::Assistant => "Assistant",
            };
            format!("{}: {}", label, turn.content())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate help text
fn help_text() -> String {
    r#"citytime Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit citytime
  reset            Start a new session (forgets history)
  history          Show the conversation so far
  status           Show current configuration
  time <zone>      Look up a timezone directly (raw tool output)
  style <name>     Switch response style: raw | conversational
  debug            Toggle debug mode

Anything else is sent to the assistant, e.g.
  What time is it in Dubai?
─────────────────────────────────────────────"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, Message, ToolDefinition};
    use crate::llm::{GenerateOptions, LLMProvider, LLMResponse};
    use crate::time::LocalResolver;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl LLMProvider for Offline {
        async fn chat_with_tools(
            &self,
            _model: &str,
            _messages: &[Message],
            _tools: &[ToolDefinition],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            Err(crate::core::CityTimeError::backend(None, "offline"))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    fn agent() -> Agent {
        Agent::from_parts(
            Config::default(),
            Arc::new(Offline),
            Arc::new(LocalResolver::new()),
        )
    }

    #[tokio::test]
    async fn test_basic_commands() {
        let mut agent = agent();
        let session = Session::new();

        for (input, expected) in [
            ("exit", CommandResult::Exit),
            ("/quit", CommandResult::Exit),
            ("RESET", CommandResult::Reset),
        ] {
            assert_eq!(handle_command(input, &mut agent, &session).await.unwrap(), expected);
        }

        assert_eq!(
            handle_command("What time is it in Dubai?", &mut agent, &session)
                .await
                .unwrap(),
            CommandResult::Continue("What time is it in Dubai?".to_string())
        );
    }

    #[tokio::test]
    async fn test_time_command_prints_raw_lookup() {
        let mut agent = agent();
        let session = Session::new();

        let CommandResult::Handled(raw) = handle_command("time Asia/Dubai", &mut agent, &session)
            .await
            .unwrap()
        else {
            panic!("expected handled output");
        };
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["timezone"], "Asia/Dubai");

        let CommandResult::Handled(raw) = handle_command("time Mars/Phobos", &mut agent, &session)
            .await
            .unwrap()
        else {
            panic!("expected handled output");
        };
        assert!(raw.contains("unknown_timezone"));
    }

    #[tokio::test]
    async fn test_bare_time_is_a_message() {
        let mut agent = agent();
        let session = Session::new();
        assert_eq!(
            handle_command("time", &mut agent, &session).await.unwrap(),
            CommandResult::Continue("time".to_string())
        );
    }

    #[tokio::test]
    async fn test_style_switches_instruction() {
        let mut agent = agent();
        let session = Session::new();

        handle_command("style raw", &mut agent, &session).await.unwrap();
        assert_eq!(
            agent.config().agent.system_instruction,
            ResponseStyle::Raw.instruction()
        );

        let result = handle_command("style shouty", &mut agent, &session).await.unwrap();
        assert!(matches!(result, CommandResult::Handled(msg) if msg.contains("unknown response style")));
        assert_eq!(
            agent.config().agent.system_instruction,
            ResponseStyle::Raw.instruction()
        );
    }

    #[tokio::test]
    async fn test_unknown_slash_command() {
        let mut agent = agent();
        let session = Session::new();
        let result = handle_command("/frobnicate", &mut agent, &session).await.unwrap();
        assert!(matches!(result, CommandResult::Handled(msg) if msg.contains("Unknown command")));
    }

    #[test]
    fn test_history_rendering() {
        let mut session = Session::new();
        assert_eq!(render_history(&session), "No messages yet.");

        session.record_exchange("Hi", "Hello!");
        assert_eq!(render_history(&session), "You: Hi\nAssistant: Hello!");
    }
}
