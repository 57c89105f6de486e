use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use deepfocus_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "deepfocus-cli", version, about = "DeepFocus CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pomodoro timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Focus score and distraction statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Site blocklist
    Block {
        #[command(subcommand)]
        action: commands::block::BlockAction,
    },
    /// Dimming, grayscale, content filters and soundscape
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the background daemon in the foreground
    Run,
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Stats { action } => commands::stats::run(action, &config),
        Commands::Block { action } => commands::block::run(action, &config),
        Commands::Focus { action } => commands::focus::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Run => commands::run::run(&config),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "deepfocus-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
