//! Interactive REPL for citytime
//!
//! Provides the main user interaction loop. The REPL owns the session; each
//! submitted line is processed to completion before the next is read.

use std::io::{self, BufRead, Write};

use crate::agent::{Agent, Session};
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
    session: Session,
}

impl Repl {
    /// Create a REPL around an existing agent
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            session: Session::new(),
        }
    }

    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self::new(Agent::with_config(config)?))
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            self.agent.await_input();

            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.agent, &self.session).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Reset) => {
                    self.session = Session::new();
                    println!("Started a new session.\n");
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                }
                Ok(CommandResult::Continue(input)) => self.send(&input).await,
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Run one turn and print the outcome
    async fn send(&mut self, input: &str) {
        match self.agent.process_turn(&mut self.session, input).await {
            Ok(reply) => {
                if self.agent.config().agent.debug {
                    for call in self.agent.last_invocations() {
                        let status = if call.success { "✓" } else { "✗" };
                        println!("  {} {} {}", status, call.tool_name, call.arguments);
                    }
                }
                println!("\nAssistant:\n{}\n", reply);
            }
            Err(e) => {
                eprintln!("\nChat error: {}\n", e);
            }
        }
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();

        println!();
        println!("🕒 citytime - ask for the time anywhere");
        println!("Backend:     {} ({})", self.agent.backend_name(), config.llm.model);
        println!("Time source: {}", self.agent.resolver_name());
        println!();
        println!("Commands: help, history, time <zone>, style, reset, exit");
        println!("─────────────────────────────────────────────");
    }
}
