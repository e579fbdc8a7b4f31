//! LexDuel CLI - Live Legal Debate Client
//!
//! A command-line front end for the LexDuel debate service: submits a case,
//! streams the courtroom proceedings, and optionally saves the concluded
//! debate.

use clap::Parser;
use colored::Colorize;
use lexduel_core::{
    ApiClient, ClientConfig, CounselRole, DebateSessionController, DebateState, EntryBody,
    SessionNotification, TranscriptEntry, WsConnector,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lexduel",
    version,
    about = "Live Legal Debate Client - Stream an AI courtroom debate for your case",
    long_about = "Submits an incident description and supporting evidence to the LexDuel \
                  debate service, streams the resulting courtroom proceedings, and can \
                  persist the concluded debate."
)]
struct Cli {
    /// Description of the incident, including circumstances and parties
    #[arg(value_name = "INCIDENT")]
    incident: String,

    /// Supporting evidence: documents, statements, materials
    #[arg(value_name = "EVIDENCE")]
    evidence: String,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Override the realtime channel URL
    #[arg(long, value_name = "URL")]
    realtime_url: Option<String>,

    /// Save the debate to the database after it concludes
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Configuration precedence: flags, then environment, then config file.
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Ok(base) = env::var("LEXDUEL_API_BASE") {
        config.endpoints.api_base = base;
    }
    if let Ok(url) = env::var("LEXDUEL_REALTIME_URL") {
        config.endpoints.realtime_url = url;
    }
    if let Some(base) = cli.api_base {
        config.endpoints.api_base = base;
    }
    if let Some(url) = cli.realtime_url {
        config.endpoints.realtime_url = url;
    }

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  {} - Live Legal Debate Session", "LexDuel".bold())
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    let api = ApiClient::new(config.endpoints.api_base.clone());
    let connector = WsConnector::new(config.endpoints.realtime_url.clone());
    let mut controller = DebateSessionController::new(Box::new(api), Box::new(connector))
        .with_callback(create_console_callback());

    controller
        .start_session(&cli.incident, &cli.evidence)
        .await?;
    let outcome = controller.run_to_completion().await?;

    match outcome {
        DebateState::Concluded => {
            if cli.save {
                controller.save_and_reset().await?;
            } else {
                println!(
                    "  {}",
                    "Run again with --save to store the debate history.".dimmed()
                );
            }
            println!();
            println!("{}", "═".repeat(70).bright_blue());
            println!("{}", "  Debate concluded.".bright_green().bold());
            println!("{}", "═".repeat(70).bright_blue());
            println!();
            Ok(())
        }
        outcome => {
            println!();
            println!("{}", "  The debate did not conclude.".red().bold());
            Err(format!("debate ended in state {:?}", outcome).into())
        }
    }
}

/// Create a callback that renders session notifications to the console.
fn create_console_callback() -> lexduel_core::SessionCallback {
    Box::new(|notification| match notification {
        SessionNotification::EntryAppended(entry) => render_entry(entry),
        SessionNotification::TypingChanged(Some(role)) => {
            println!(
                "  {}",
                format!("{} is preparing an argument...", role.display_name()).dimmed()
            );
        }
        SessionNotification::TypingChanged(None) => {}
    })
}

fn render_entry(entry: &TranscriptEntry) {
    let time = entry.created_at.format("%H:%M:%S");
    match &entry.body {
        EntryBody::StatusNotice { message } => {
            println!("  {} {}", format!("[{}]", time).dimmed(), message.dimmed());
        }
        EntryBody::ErrorNotice { message } => {
            println!(
                "  {} {} {}",
                format!("[{}]", time).dimmed(),
                "⚠".red().bold(),
                message.red()
            );
        }
        EntryBody::InitialAnalysis { argument, context } => {
            println!();
            println!("{}", "─".repeat(70).yellow());
            println!(
                "{}",
                "  Case Analysis & Initial Arguments".yellow().bold()
            );
            if let Some(prompt) = context
                .processed_prompt
                .as_ref()
                .and_then(|p| p.refined_prompt.as_deref())
            {
                println!("  {} \"{}\"", "Case Analysis:".bold(), prompt.italic());
            }
            if let Some(section) = context.ipc_section.as_deref() {
                println!("  {} {}", "Relevant IPC Section:".bold(), section);
            }
            if let Some(case) = &context.similar_case {
                println!(
                    "  {} {}",
                    "Case Precedent:".bold(),
                    case.case_id_name.as_deref().unwrap_or("Unknown Case")
                );
                if let Some(summary) = case.case_summary.as_deref() {
                    println!("    {}", format!("\"{}\"", summary).dimmed());
                }
            }
            println!("{}", "─".repeat(70).yellow());
            render_argument(argument, "Supporting Counsel".green().bold().to_string());
        }
        EntryBody::DebateArgument {
            round,
            role,
            argument,
        } => {
            let header = match role {
                Some(CounselRole::Supporting) => {
                    format!("Supporting Counsel - Round {}", round).green().bold()
                }
                Some(CounselRole::Opposing) => {
                    format!("Opposing Counsel - Round {}", round).red().bold()
                }
                None => format!("Counsel - Round {}", round).normal().bold(),
            };
            render_argument(argument, header.to_string());
        }
        EntryBody::Conclusion { total_rounds } => {
            println!();
            println!("{}", "═".repeat(70).yellow());
            println!("{}", "  Final Verdict".yellow().bold());
            if let Some(rounds) = total_rounds {
                println!(
                    "  The legal proceedings have concluded after {} rounds of arguments.",
                    rounds
                );
            }
            println!("{}", "═".repeat(70).yellow());
        }
    }
}

fn render_argument(argument: &lexduel_core::Argument, header: String) {
    println!();
    println!("  {} {}", "▶".bright_cyan(), header);
    if let Some(point) = argument.point.as_deref() {
        for line in textwrap(point, 66).lines() {
            println!("  {}", line);
        }
    }
    if !argument.evidence.is_empty() {
        println!("  {}", "Supporting Evidence:".bold());
        for item in &argument.evidence {
            println!("    • {}", item);
        }
    }
    if let Some(demand) = argument.demand.as_deref() {
        println!("  {} {}", "Legal Demand:".bold(), demand);
    }
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}
