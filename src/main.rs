use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use prdgen::app::{self, App};
use prdgen::{export, handler, logging, tui, ui};
use prdgen::{Config, Error, GeminiClient};

#[derive(Parser)]
#[command(name = "prdgen")]
#[command(about = "Generate Product Requirements Documents from a short product description")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a PRD without the TUI and print it to stdout
    Generate {
        /// Product description (up to 500 characters)
        prompt: String,
        /// Write PRD.md into DIR instead of printing
        #[arg(short, long, value_name = "DIR")]
        save: Option<PathBuf>,
        /// Model to use for this invocation
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Store the Gemini API key in the config file
    SetKey {
        /// API key for the Gemini API
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = logging::init()?;
    info!(log_dir = %log_dir.display(), "starting prdgen");

    let config = Config::load().unwrap_or_else(|_| Config::new());

    match cli.command {
        Some(Commands::SetKey { key }) => {
            Config::save_api_key(&key)?;
            println!("API key saved to {}", Config::display_path().display());
            Ok(())
        }
        Some(Commands::Generate {
            prompt,
            save,
            model,
        }) => generate_once(&config, &prompt, save, model).await,
        None => run_tui(&config).await,
    }
}

async fn generate_once(
    config: &Config,
    prompt: &str,
    save: Option<PathBuf>,
    model: Option<String>,
) -> Result<()> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(Error::EmptyPrompt.into());
    }
    let len = prompt.chars().count();
    if len > app::MAX_PROMPT_CHARS {
        return Err(Error::prompt_too_long(len, app::MAX_PROMPT_CHARS).into());
    }

    let mut client = GeminiClient::from_config(config)?;
    if let Some(model) = model {
        client = client.with_model(model);
    }

    // Progress on stderr; stdout carries only the document
    eprintln!("Generating PRD with {}...", client.model());
    let document = client.generate_prd(prompt, &[]).await?;

    match save {
        Some(dir) => {
            let path = export::write_prd(&dir, &document)?;
            println!("{}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

async fn run_tui(config: &Config) -> Result<()> {
    // Fail fast on a missing credential before touching the terminal
    let client = GeminiClient::from_config(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event);
        }

        // Land any finished generation before the next draw
        app.poll_generation().await;
    }

    tui::restore()?;
    Ok(())
}
