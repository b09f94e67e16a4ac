// src/cli.rs
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use gym_log_lib::YearMonth;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI tool to keep a workout journal", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a new workout
    Add {
        /// Workout date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Free-text note about the session
        #[arg(long, default_value = "")]
        note: String,

        /// Activity performed (e.g. "Squat", "Running")
        #[arg(long, default_value = "")]
        activity: String,

        /// How the session felt
        #[arg(long, default_value = "")]
        mood: String,

        /// What you listened to
        #[arg(long, default_value = "")]
        music: String,

        /// Weights used
        #[arg(long, default_value = "")]
        weights: String,

        /// Machines used
        #[arg(long, default_value = "")]
        machines: String,
    },
    /// List all logged workouts
    List,
    /// Delete a workout entry
    Delete {
        /// ID of the workout to delete
        id: i64,
    },
    /// Show a month calendar with workout days highlighted
    Calendar {
        /// Month to show (YYYY-MM); defaults to the current month
        #[arg(short, long)]
        month: Option<YearMonth>,

        /// Also show the preceding month above
        #[arg(long)]
        with_previous: bool,
    },
    /// Export the whole journal to a CSV file
    Export {
        /// Destination file; defaults to gym_data.csv in the app data directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage the daily workout reminder
    Reminder {
        #[command(subcommand)]
        action: ReminderAction,
    },
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReminderAction {
    /// Enable the reminder, optionally picking a new time
    On {
        /// Reminder time (HH:MM); defaults to the configured time
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Disable the reminder and cancel the pending job
    Off,
    /// Show the reminder settings and any pending job
    Status,
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

// Expose the command structure for completion generation
pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
