use std::fs::OpenOptions;
use std::sync::Mutex;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Password};
use anyhow::Result;
use tracing_subscriber::EnvFilter;
use todoai_core::credentials::mask_key;
use todoai_core::{Config, ConfigStore, Credentials, GenerateError, KeySource, TaskGenerator};

mod app;
mod handler;
mod input;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, TICK_RATE};

#[derive(Parser)]
#[command(name = "todoai")]
#[command(about = "Todo list with AI-generated tasks, powered by Mistral")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate todo items from a description and print them
    Generate {
        /// What you want to get done
        prompt: String,
    },
    /// Manage the saved Mistral API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save an API key (prompts for it when omitted)
    Set {
        value: Option<String>,
    },
    /// Remove the saved API key
    Clear,
    /// Show where the active key comes from
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            init_file_logging();
            run_tui().await?
        }
        Some(command) => {
            init_stderr_logging();
            match command {
                Commands::Generate { prompt } => generate(&prompt).await?,
                Commands::Key { action } => manage_key(action)?,
            }
        }
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the terminal, so logs go to `<config_dir>/todoai/todoai.log`
fn init_file_logging() {
    let file = Config::app_dir().and_then(|dir| {
        std::fs::create_dir_all(&dir)?;
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("todoai.log"))?)
    });

    // Without a log file the TUI simply runs without logging
    if let Ok(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}

async fn run_tui() -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);
    let mut app = App::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn generate(prompt: &str) -> Result<()> {
    let credentials = Credentials::new(ConfigStore::new()?);
    let generator = TaskGenerator::new();

    println!("🤖 Generating todos for: {}\n", prompt.cyan());

    let result = generator.try_generate(&credentials.resolve(), prompt).await;
    match &result {
        Ok(_) => {
            for line in generated_lines(&result) {
                println!("{}", line);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "task generation failed");
            for line in generated_lines(&result) {
                println!("{}", line.red());
            }
        }
    }

    Ok(())
}

/// Numbered tasks on success. A failure is a single unnumbered line.
fn generated_lines(result: &Result<Vec<String>, GenerateError>) -> Vec<String> {
    match result {
        Ok(tasks) => tasks
            .iter()
            .enumerate()
            .map(|(i, task)| format!("{}. {}", i + 1, task))
            .collect(),
        Err(e) => vec![e.to_display_line()],
    }
}

fn manage_key(action: KeyAction) -> Result<()> {
    let store = ConfigStore::new()?;
    let path = store.path().to_path_buf();
    let mut credentials = Credentials::new(store);

    match action {
        KeyAction::Set { value } => {
            let value = match value {
                Some(value) => value,
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt("Mistral API key")
                    .allow_empty_password(true)
                    .interact()?,
            };
            credentials.set(&value)?;
            if value.trim().is_empty() {
                println!("{}", "Saved API key removed".yellow());
            } else {
                println!("{} {}", "API key saved to".green(), path.display());
            }
        }
        KeyAction::Clear => {
            credentials.clear()?;
            println!("{}", "Saved API key removed".yellow());
        }
        KeyAction::Show => {
            let source = credentials.source();
            let label = match source {
                KeySource::User => source.as_str().green(),
                KeySource::Default => source.as_str().yellow(),
                KeySource::None => source.as_str().red(),
            };
            println!("{} {}", "API key:".bold(), label);
            if source != KeySource::None {
                println!("  {}", mask_key(&credentials.resolve()).dimmed());
            }
            println!("  {} {}", "config:".dimmed(), path.display());
        }
    }

    Ok(())
}
