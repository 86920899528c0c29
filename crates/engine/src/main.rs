//! AI Studio - command line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aistudio_domain::StyleId;
use aistudio_engine::infrastructure::settings::StudioSettings;
use aistudio_engine::use_cases::GenerationOutcome;
use aistudio_engine::App;

#[derive(Parser, Debug)]
#[command(name = "aistudio", version, about = "Transform an image with a prompt and a style")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a styled image from an upload. Ctrl-C aborts.
    Generate(GenerateArgs),
    /// Show recent generations, newest first.
    History(HistoryArgs),
    /// List the available styles.
    Styles,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Source image (PNG, JPEG, GIF or WebP, at most 10 MB).
    #[arg(long)]
    image: PathBuf,

    /// What to do with the image (at most 500 characters).
    #[arg(long)]
    prompt: String,

    /// Style id, see `aistudio styles`.
    #[arg(long, default_value_t = StyleId::default().to_string())]
    style: String,
}

#[derive(Parser, Debug)]
struct HistoryArgs {
    /// Delete the stored history instead of printing it.
    #[arg(long, default_value_t = false)]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_dotenv();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aistudio_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Command::Styles = cli.cmd {
        cmd_styles();
        return Ok(ExitCode::SUCCESS);
    }

    let app = App::from_settings(StudioSettings::from_env());
    match cli.cmd {
        Command::Generate(args) => cmd_generate(&app, args).await,
        Command::History(args) => {
            cmd_history(&app, args);
            Ok(ExitCode::SUCCESS)
        }
        Command::Styles => Ok(ExitCode::SUCCESS),
    }
}

fn load_dotenv() {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let _ = dotenvy::from_filename(filename);
    }
}

async fn cmd_generate(app: &App, args: GenerateArgs) -> anyhow::Result<ExitCode> {
    let request = app
        .prepare_request(&args.image, &args.prompt, &args.style)
        .with_context(|| format!("cannot use {}", args.image.display()))?;

    let mut transitions = app.controller.transitions();
    tokio::spawn(async move {
        loop {
            let state = match transitions.recv().await {
                Ok(state) => state,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "State log fell behind");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            tracing::info!(
                phase = ?state.phase,
                retry_count = state.retry_count,
                aborted = state.is_aborted,
                message = state.error.as_deref().unwrap_or(""),
                "State changed"
            );
        }
    });

    let handle = app.controller.start(request)?;
    let mut pending = std::pin::pin!(handle.outcome());
    let outcome = tokio::select! {
        outcome = &mut pending => outcome,
        _ = tokio::signal::ctrl_c() => {
            app.controller.abort();
            pending.await
        }
    };

    match outcome {
        GenerationOutcome::Succeeded(result) => {
            println!("{}", result.generated_image);
            println!(
                "{} {} \"{}\" ({})",
                result.style.emoji(),
                result.style.label(),
                result.prompt,
                result.id
            );
            Ok(ExitCode::SUCCESS)
        }
        GenerationOutcome::Failed {
            message,
            retry_count,
        } => {
            eprintln!("Generation failed after {retry_count} retries: {message}");
            Ok(ExitCode::FAILURE)
        }
        GenerationOutcome::Aborted { .. } => {
            eprintln!("Generation aborted");
            Ok(ExitCode::from(130))
        }
    }
}

fn cmd_history(app: &App, args: HistoryArgs) {
    if args.clear {
        app.history.clear();
        println!("History cleared");
        return;
    }

    let entries = app.history.list();
    if entries.is_empty() {
        println!("No generations yet");
        return;
    }
    for entry in entries {
        println!(
            "{}  {} {:<10} {}  \"{}\"\n    {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.style.emoji(),
            entry.style.as_str(),
            entry.id,
            entry.prompt,
            entry.generated_image
        );
    }
}

fn cmd_styles() {
    for style in StyleId::ALL {
        let marker = if style == StyleId::default() {
            " (default)"
        } else {
            ""
        };
        println!("{} {:<10} {}{}", style.emoji(), style.as_str(), style.label(), marker);
    }
}
