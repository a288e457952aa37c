mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gabu_tutor::adaptive::types::Difficulty;
use gabu_tutor::collaboration::ReportPeriod;
use gabu_tutor::config::TutorConfig;

#[derive(Parser)]
#[command(name = "gabu", version, about = "Gabu's Tutor: homework help, streaks, and study reminders")]
struct Cli {
    /// Config file (defaults to ~/.gabu/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat the device as offline: cached answers queue for `gabu sync`
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a typed question. Without arguments, starts a chat read from stdin.
    Ask {
        question: Vec<String>,
        /// Bookmark the answer
        #[arg(long)]
        bookmark: bool,
    },
    /// Explain a photo of a homework problem or a recorded question
    Explain {
        file: PathBuf,
        #[arg(long)]
        bookmark: bool,
    },
    /// Take a multiple-choice quiz on a topic
    Quiz {
        topic: Vec<String>,
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// Generate a labeled diagram
    Illustrate {
        description: Vec<String>,
        /// Where to write the image (extension is chosen from the image type)
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[arg(long)]
        bookmark: bool,
    },
    /// Show study time, streak, and weekly goal
    Progress {
        /// Set the weekly goal in minutes
        #[arg(long)]
        goal: Option<u32>,
    },
    /// Run a Pomodoro focus session
    Focus {
        #[arg(long)]
        minutes: Option<u64>,
        #[arg(long = "topic")]
        topics: Vec<String>,
    },
    /// Saved explanations, quizzes, and diagrams
    Bookmarks {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Learning report for a parent or teacher
    Report {
        #[arg(default_value = "weekly")]
        period: ReportPeriod,
        /// Print the shareable text summary
        #[arg(long)]
        share: bool,
    },
    /// Personalized study recommendations
    Recommend,
    /// Learning analytics from the activity history
    Analytics,
    /// Study reminders
    Reminders {
        #[command(subcommand)]
        action: ReminderAction,
    },
    /// Replay changes queued while offline
    Sync,
    /// Walk through the onboarding tutorial
    Tutorial {
        #[arg(long)]
        next: bool,
        #[arg(long)]
        skip: bool,
        #[arg(long)]
        reset: bool,
    },
    /// Check database health and configuration
    Doctor,
    /// Export every stored document as JSON to stdout
    Export,
    /// Import documents from an export file
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum BookmarkAction {
    List,
    Search { query: Vec<String> },
    Delete { id: String },
}

#[derive(Subcommand)]
enum ReminderAction {
    List,
    Add {
        #[arg(long)]
        title: String,
        /// Local time, HH:MM
        #[arg(long)]
        time: String,
        /// Weekdays, Sunday = 0, e.g. 1,3,5
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<u8>,
        #[arg(long, default_value = "")]
        message: String,
    },
    Remove { id: String },
    Toggle { id: String },
    /// Fire reminders until interrupted
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TutorConfig::load_from(path)?,
        None => TutorConfig::load()?,
    };
    if cli.offline {
        config.offline.start_offline = true;
    }

    // stderr keeps stdout clean for command output and `export`
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ask { question, bookmark } => {
            cli::ask::ask(config, &question.join(" "), bookmark).await?
        }
        Command::Explain { file, bookmark } => cli::ask::explain(config, &file, bookmark).await?,
        Command::Quiz {
            topic,
            count,
            difficulty,
        } => cli::ask::quiz(config, &topic.join(" "), count, difficulty).await?,
        Command::Illustrate {
            description,
            out,
            bookmark,
        } => cli::ask::illustrate(config, &description.join(" "), out.as_deref(), bookmark).await?,
        Command::Progress { goal } => cli::progress::progress(config, goal)?,
        Command::Focus { minutes, topics } => cli::progress::focus(config, minutes, &topics).await?,
        Command::Bookmarks { action } => match action {
            BookmarkAction::List => cli::progress::bookmarks(config, None)?,
            BookmarkAction::Search { query } => {
                cli::progress::bookmarks(config, Some(&query.join(" ")))?
            }
            BookmarkAction::Delete { id } => cli::progress::delete_bookmark(config, &id)?,
        },
        Command::Report { period, share } => cli::report::report(config, period, share)?,
        Command::Recommend => cli::report::recommend(config)?,
        Command::Analytics => cli::report::analytics(config)?,
        Command::Reminders { action } => match action {
            ReminderAction::List => cli::reminders::list(config)?,
            ReminderAction::Add {
                title,
                time,
                days,
                message,
            } => cli::reminders::add(config, title, time, days, message)?,
            ReminderAction::Remove { id } => cli::reminders::remove(config, &id)?,
            ReminderAction::Toggle { id } => cli::reminders::toggle(config, &id)?,
            ReminderAction::Run => cli::reminders::run(config).await?,
        },
        Command::Sync => cli::sync::sync(config).await?,
        Command::Tutorial { next, skip, reset } => cli::tutorial::tutorial(config, next, skip, reset)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Export => cli::export::export(&config)?,
        Command::Import { file } => cli::import::import(&config, &file)?,
    }

    Ok(())
}
