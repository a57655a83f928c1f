use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use grid_quiz::{
    compatibility_report, default_questions, load_questions_from_json, run_tui, AppError, Backend,
    Config, FirebaseStore, Identity, MemoryStore, PollConfig, StartScreen, DATABASE_URL_ENV,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Your name; together with --group this skips the entry screen
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// Group code shared with the people you want to match with
    #[arg(short, long, global = true)]
    group: Option<String>,

    /// Base URL of the realtime database
    #[arg(long, env = DATABASE_URL_ENV, global = true)]
    database_url: Option<String>,

    /// Keep responses in memory instead of a remote database
    #[arg(long, global = true)]
    offline: bool,

    /// JSON file to load the questions from
    #[arg(short, long, global = true)]
    questions: Option<PathBuf>,

    /// Seconds between match lookups
    #[arg(long, default_value_t = 5, global = true)]
    poll_interval: u64,

    /// Seconds the loading message stays up at least
    #[arg(long, default_value_t = 3, global = true)]
    min_display: u64,

    /// Seconds to wait for the database to accept a submission
    #[arg(long, default_value_t = 10, global = true)]
    submit_timeout: u64,

    /// File log output is written to
    #[arg(long, default_value = "grid-quiz.log", global = true)]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Take the quiz, then wait for matches (default)
    Play,
    /// Skip straight to the matches for your group
    Matches,
    /// Print how closely everyone else in your group answered like you
    Score,
}

impl Args {
    fn identity(&self) -> Result<Option<Identity>, AppError> {
        match (&self.name, &self.group) {
            (Some(name), Some(group)) => Ok(Some(Identity::new(name, group)?)),
            (None, None) => Ok(None),
            _ => Err(AppError::Config(
                "--name and --group must be given together".to_string(),
            )),
        }
    }

    fn backend(&self) -> Result<Backend, AppError> {
        if self.offline {
            return Ok(Backend::Offline);
        }
        match &self.database_url {
            Some(url) => Ok(Backend::Remote(url.clone())),
            None => Err(AppError::Config(format!(
                "no database configured; pass --database-url, set {}, or use --offline",
                DATABASE_URL_ENV
            ))),
        }
    }

    fn config(&self) -> Result<Config, AppError> {
        let mut config = Config::new(self.backend()?);
        config.questions = match &self.questions {
            Some(path) => load_questions_from_json(path)?,
            None => default_questions(),
        };
        config.poll = PollConfig {
            interval: Duration::from_secs(self.poll_interval.max(1)),
            min_display: Duration::from_secs(self.min_display),
        };
        config.submit_timeout = Duration::from_secs(self.submit_timeout.max(1));
        config.identity = self.identity()?;
        config.start = match self.command {
            Some(Command::Matches) => StartScreen::Waiting,
            _ => StartScreen::Quiz,
        };
        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<(), AppError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn score(config: Config) -> Result<(), AppError> {
    let identity = config
        .identity
        .ok_or_else(|| AppError::Config("score needs --name and --group".to_string()))?;

    let Backend::Remote(url) = &config.backend else {
        return Err(AppError::Config(
            "score reads stored responses; it needs --database-url, not --offline".to_string(),
        ));
    };
    let ranked = compatibility_report(&FirebaseStore::new(url)?, &identity).await?;

    if ranked.is_empty() {
        println!("Nobody else in {} has finished yet.", identity.group_code());
    }
    for entry in ranked {
        println!("{:>3}%  {}", entry.compatibility, entry.user_name);
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), AppError> {
    init_logging(&args.log_file)?;
    let config = args.config()?;
    config.log_summary();

    if args.command == Some(Command::Score) {
        return score(config).await;
    }

    match config.backend.clone() {
        Backend::Remote(url) => {
            let store = FirebaseStore::new(&url)?;
            run_tui(store, config).await
        }
        Backend::Offline => run_tui(MemoryStore::new(), config).await,
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
