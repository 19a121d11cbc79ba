//! Macmate CLI - natural-language macOS assistant
//!
//! Thin presentation layer over macmate-core: a line-based chat REPL plus
//! utility subcommands for inspecting tools and configuration.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use macmate_core::session::persistence;
use macmate_core::{
    create_model_client, create_package_manager, Config, ConfigManager, SessionConfig,
    SessionInput, SessionManager, SessionOutput, ToolRegistry, ToolRegistryBuilder,
    DEFAULT_SYSTEM_PROMPT,
};

#[derive(Parser)]
#[command(name = "macmate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Natural-language assistant for macOS software and app control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Model override (defaults to the configured model)
    #[arg(short, long)]
    model: Option<String>,

    /// Execute a single prompt and exit (non-interactive mode)
    #[arg(long)]
    one_shot: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat mode (default)
    Chat,

    /// Show available tools
    Tools,

    /// Show configuration
    Config,

    /// List saved sessions
    Sessions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new().context("failed to load configuration")?;
    let mut config = config_manager.config().clone();
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }

    let filter = if cli.verbose {
        EnvFilter::new("macmate_core=debug,macmate=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.clone()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Tools) => show_tools(&config),
        Some(Commands::Config) => show_config(&config_manager),
        Some(Commands::Sessions) => show_sessions(),
        Some(Commands::Chat) | None => {
            if let Some(prompt) = cli.one_shot {
                run_one_shot(&config, prompt).await
            } else {
                run_chat(&config).await
            }
        }
    }
}

/// Build the shared tool registry from configuration
fn build_registry(config: &Config) -> anyhow::Result<ToolRegistry> {
    let manager = create_package_manager(&config.packages)?;
    let registry = ToolRegistryBuilder::new(manager, config.packages.clone()).build()?;
    Ok(registry)
}

/// Build the session manager wired to the configured model and tools
fn build_session_manager(
    config: &Config,
) -> anyhow::Result<(SessionManager, macmate_core::session::OutputReceiver)> {
    let registry = Arc::new(build_registry(config)?);
    let model = create_model_client(&config.provider, DEFAULT_SYSTEM_PROMPT)
        .context("failed to create model client")?;

    let limits = config.limits.clone();
    let save = config.general.save_sessions;
    let factory = move || {
        SessionConfig::new(model.clone(), registry.clone())
            .with_limits(limits.clone())
            .with_save_session(save)
    };

    Ok(SessionManager::new(factory))
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let (manager, mut output_rx) = build_session_manager(config)?;
    let session_id = "cli";
    tracing::info!(model = %config.provider.model, "starting chat session");

    println!(
        "{} {}",
        style("Macmate").cyan().bold(),
        style("- type a request, /reset to clear history, /quit to exit").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", style(">").green().bold());
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();

        if line.is_empty() {
            continue;
        }
        match line.as_str() {
            "/quit" | "/exit" => break,
            "/reset" => {
                manager
                    .push_message(session_id, SessionInput::reset())
                    .await?;
            }
            _ => {
                manager
                    .push_message(session_id, SessionInput::user_message(line))
                    .await?;
            }
        }

        drain_until_idle(&mut output_rx).await;
    }

    manager.stop_all().await?;
    Ok(())
}

async fn run_one_shot(config: &Config, prompt: String) -> anyhow::Result<()> {
    let (manager, mut output_rx) = build_session_manager(config)?;

    manager
        .push_message("one-shot", SessionInput::user_message(prompt))
        .await?;
    drain_until_idle(&mut output_rx).await;

    manager.stop_all().await?;
    Ok(())
}

/// Print session outputs until the turn completes
async fn drain_until_idle(output_rx: &mut macmate_core::session::OutputReceiver) {
    while let Some((_, output)) = output_rx.recv().await {
        match output {
            SessionOutput::Idle => break,
            SessionOutput::Ready | SessionOutput::UserMessage { .. } => {}
            SessionOutput::Thinking => {
                eprintln!("{}", style("thinking...").dim());
            }
            SessionOutput::ToolStart { name, arguments, .. } => {
                println!(
                    "{} {}({})",
                    style("⚙").yellow(),
                    style(&name).yellow(),
                    style(compact_args(&arguments)).dim()
                );
            }
            SessionOutput::ToolDone { name, success, .. } => {
                let mark = if success {
                    style("✓").green()
                } else {
                    style("✗").red()
                };
                println!("{} {}", mark, style(&name).dim());
            }
            SessionOutput::AssistantMessage { content, .. } => {
                println!("\n{}\n", content);
            }
            SessionOutput::TurnFailed { message, .. } => {
                println!("{} {}", style("turn failed:").red().bold(), message);
            }
            SessionOutput::HistoryCleared => {
                println!("{}", style("history cleared").dim());
            }
            SessionOutput::Error { message } => {
                println!("{} {}", style("error:").red().bold(), message);
            }
        }
    }
}

/// One-line rendering of tool arguments for display
fn compact_args(arguments: &serde_json::Value) -> String {
    match arguments.as_object() {
        Some(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", "),
        None => arguments.to_string(),
    }
}

fn show_tools(config: &Config) -> anyhow::Result<()> {
    let registry = build_registry(config)?;

    println!("{}", style("Available tools:").bold());
    for def in registry.list() {
        println!("  {} - {}", style(&def.name).cyan(), def.description);
    }
    Ok(())
}

fn show_config(config_manager: &ConfigManager) -> anyhow::Result<()> {
    let config = config_manager.config();

    println!("{} {:?}", style("Config file:").bold(), config_manager.config_path());
    println!("  provider:   {}", config.provider.provider_type);
    println!("  model:      {}", config.provider.model);
    println!(
        "  api key:    {}",
        if config.provider.get_api_key().is_some() {
            "configured"
        } else {
            "missing"
        }
    );
    println!("  pkg manager: {}", config.packages.manager);
    println!("  call limit:  {}", config.limits.max_tool_calls);
    println!("  max history: {}", config.limits.max_history);
    Ok(())
}

fn show_sessions() -> anyhow::Result<()> {
    let sessions = persistence::list_sessions()?;
    if sessions.is_empty() {
        println!("No saved sessions.");
        return Ok(());
    }

    println!("{}", style("Saved sessions:").bold());
    for name in sessions {
        match persistence::load_session(&name) {
            Ok(saved) => println!(
                "  {} - {} messages, updated {}",
                style(&name).cyan(),
                saved.messages.len(),
                saved.updated_at.format("%Y-%m-%d %H:%M")
            ),
            Err(_) => println!("  {} - (unreadable)", style(&name).red()),
        }
    }
    Ok(())
}
