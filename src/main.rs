//! citytime - ask what time it is anywhere
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;

use citytime::core::{ResponseStyle, TimeSource};
use citytime::time::resolver_from_config;
use citytime::{Agent, Config, Repl, Session};

/// citytime - ask what time it is anywhere
#[derive(Parser, Debug)]
#[command(name = "citytime")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gemini model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Response style: raw or conversational
    #[arg(long, short = 's')]
    style: Option<ResponseStyle>,

    /// Use the remote time service instead of the local tz database
    #[arg(long)]
    remote: bool,

    /// Config file to load instead of the default location
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Look up a timezone directly and print the raw tool output
    #[arg(long, value_name = "ZONE")]
    lookup: Option<String>,
}

fn init_tracing(debug: bool) {
    let default = if debug { "citytime=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = match args.config {
        Some(ref path) => {
            let _ = dotenvy::dotenv();
            Config::load_from(path)?
        }
        None => Config::load(),
    };

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.llm.model = model.clone();
    }

    if let Some(style) = args.style {
        config.set_response_style(style);
    }

    if args.remote {
        config.time.source = TimeSource::Remote;
    }

    if args.debug {
        config.agent.debug = true;
    }

    init_tracing(config.agent.debug);

    // Direct lookup, no model involved
    if let Some(zone) = args.lookup {
        let lookup = resolver_from_config(&config).resolve(&zone).await;
        println!("{}", serde_json::to_string_pretty(&lookup)?);
        return Ok(());
    }

    let mut agent = match Agent::with_config(config) {
        Ok(agent) => agent,
        Err(e) if e.is_fatal() => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let mut session = Session::new();
        match agent.process_turn(&mut session, &prompt).await {
            Ok(reply) => println!("{}", reply),
            Err(e) => {
                eprintln!("Chat error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::new(agent);
    repl.run().await?;

    Ok(())
}
