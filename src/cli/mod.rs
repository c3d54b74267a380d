mod config_cmd;
mod history_cmd;
mod packages;
mod play;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::Level;
use crate::models::config::UserConfig;
use crate::session::Action;
use crate::store::Store;

#[derive(Parser)]
#[command(name = "utbk")]
#[command(about = "UTBK practice quizzes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a practice quiz for a package and level
    Start {
        package: String,
        #[arg(value_enum)]
        level: Level,
    },
    /// Play today's daily challenge for a package
    Daily { package: String },
    /// List the packages in the question bank
    Packages,
    /// Show past sessions
    History {
        #[arg(long, default_value_t = crate::display::HISTORY_LIMIT)]
        limit: usize,
    },
    /// Show or change settings
    Config {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        questions: Option<usize>,
        #[arg(long)]
        daily: Option<usize>,
        #[arg(long)]
        minutes: Option<u32>,
    },
}

pub fn run(cli: Cli) {
    match cli.command {
        None => play::play(None),
        Some(Commands::Start { package, level }) => {
            play::play(Some(Action::StartPractice { package, level }))
        }
        Some(Commands::Daily { package }) => play::play(Some(Action::StartDaily(package))),
        Some(Commands::Packages) => packages::list_packages(),
        Some(Commands::History { limit }) => history_cmd::show_history(limit),
        Some(Commands::Config {
            data_dir,
            questions,
            daily,
            minutes,
        }) => config_cmd::handle_config(config_cmd::ConfigChanges {
            data_dir,
            questions,
            daily,
            minutes,
        }),
    }
}

fn open_store(config: &UserConfig) -> Store {
    match Store::open(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open data directory: {}", e);
            std::process::exit(1);
        }
    }
}
