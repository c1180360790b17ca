//! match-session - command-line tools for the match session controller
//!
//! `inspect` renders a snapshot the way a given player (or a spectator) would
//! see it; `replay` runs a session script against a scripted match service.

use anyhow::Context;
use clap::{Parser, Subcommand};
use match_session::{
    core::PlayerId,
    loader::{ScriptLoader, SnapshotLoader},
    session::{
        replay, summary, OutputFormat, OutputMode, ReplayFrame, SessionConfig, SessionStatus,
        StepResult, VerbosityLevel,
    },
    view::{ScopedView, DEFAULT_GRAVEYARD_WINDOW},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "match-session")]
#[command(about = "Match session controller - inspect snapshots and replay sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a match snapshot from one player's point of view
    Inspect {
        /// Match snapshot (.json)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Viewing player (omit for the spectator view)
        #[arg(long, short = 'p', value_name = "PLAYER_ID")]
        player: Option<String>,

        /// Number of graveyard cards to list per player
        #[arg(long, default_value_t = DEFAULT_GRAVEYARD_WINDOW)]
        graveyard: usize,
    },

    /// Run a session script and print the derived state as it evolves
    Replay {
        /// Session script (.json)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Override the script's viewing player
        #[arg(long, short = 'p', value_name = "PLAYER_ID")]
        player: Option<String>,

        /// Session config file (.json)
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// Verbosity level for session logs (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v')]
        verbosity: Option<VerbosityLevel>,

        /// Emit session logs as JSON lines
        #[arg(long)]
        json_logs: bool,

        /// Print the full summary after every step, not only after pushes
        #[arg(long)]
        every_step: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            snapshot,
            player,
            graveyard,
        } => run_inspect(snapshot, player, graveyard).await?,
        Commands::Replay {
            script,
            player,
            config,
            verbosity,
            json_logs,
            every_step,
        } => run_replay(script, player, config, verbosity, json_logs, every_step).await?,
    }

    Ok(())
}

async fn run_inspect(path: PathBuf, player: Option<String>, graveyard: usize) -> anyhow::Result<()> {
    let snapshot = SnapshotLoader::load(&path)
        .await
        .with_context(|| format!("loading snapshot {}", path.display()))?;

    let view = match player {
        Some(id) => ScopedView::for_player(&snapshot, &PlayerId::new(id))?,
        None => ScopedView::for_observer(&snapshot),
    };
    print!("{}", summary::render(&view, graveyard));
    Ok(())
}

async fn run_replay(
    path: PathBuf,
    player: Option<String>,
    config_path: Option<PathBuf>,
    verbosity: Option<VerbosityLevel>,
    json_logs: bool,
    every_step: bool,
) -> anyhow::Result<()> {
    let mut script = ScriptLoader::load(&path)
        .await
        .with_context(|| format!("loading script {}", path.display()))?;
    if let Some(id) = player {
        script.viewer = Some(PlayerId::new(id));
        script.validate()?;
    }

    let mut config = match &config_path {
        Some(p) => SessionConfig::load(p)
            .await
            .with_context(|| format!("loading config {}", p.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(level) = verbosity {
        config.verbosity = level;
    }
    if json_logs {
        config.output_format = OutputFormat::Json;
    }
    config.output_mode = OutputMode::Stdout;

    let viewer = script
        .viewer
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "spectator".to_string());
    println!(
        "=== Replaying {} as {} ({} steps) ===",
        script.match_id,
        viewer,
        script.steps.len()
    );

    let report = replay(&script, config).await?;
    let last_step = report.frames.len().saturating_sub(1);
    for frame in &report.frames {
        let show_summary = every_step || frame.step == 0 || frame.step == last_step || is_push(frame);
        print_frame(frame, show_summary);
    }

    println!("\n=== {} command(s) sent ===", report.commands_sent);
    Ok(())
}

fn is_push(frame: &ReplayFrame) -> bool {
    matches!(frame.result, StepResult::Pushed)
}

fn print_frame(frame: &ReplayFrame, show_summary: bool) {
    println!("\n[{}] {} -> {}", frame.step, frame.description, frame.result);
    if let Some(feedback) = &frame.feedback {
        println!("    {feedback}");
    }
    if let SessionStatus::Failed(message) = &frame.status {
        println!("    session failed: {message}");
    }
    if show_summary {
        if let Some(text) = &frame.summary {
            for line in text.lines() {
                println!("    {line}");
            }
        }
    }
}
