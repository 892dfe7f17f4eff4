use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "medprompts", version, about = "MedPrompts CLI")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// XP, level and streak
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Badge catalog and unlocks
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Weekly challenge
    Challenge {
        #[command(subcommand)]
        action: commands::challenge::ChallengeAction,
    },
    /// Pomodoro timer control
    Pomodoro {
        #[command(subcommand)]
        action: commands::pomodoro::PomodoroAction,
    },
    /// Dashboard statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Poll for changes from other processes and drive the pomodoro countdown
    Watch(commands::watch::WatchArgs),
    /// Erase all persisted progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::Challenge { action } => commands::challenge::run(action),
        Commands::Pomodoro { action } => commands::pomodoro::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Reset { yes } => commands::reset(yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
