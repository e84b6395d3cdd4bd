//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Rounds using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Rounds - ward-round notes client
#[derive(Parser, Debug)]
#[command(name = "rounds")]
#[command(version, about, long_about = None)]
#[command(author = "Rounds Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rounds.toml", env = "ROUNDS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ROUNDS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Sign in and load today's patients
    Login(commands::login::LoginArgs),

    /// Sign out and clear the local patient cache
    Logout(commands::login::LogoutArgs),

    /// List patients for a day and department
    Patients(commands::patients::PatientsArgs),

    /// Find or create a patient by national ID
    Open(commands::patients::OpenArgs),

    /// Add a visit note to a patient
    Note(commands::visits::NoteArgs),

    /// Edit one of your visit notes
    Edit(commands::visits::EditArgs),

    /// Delete one of your visit notes
    Delete(commands::visits::DeleteArgs),

    /// Show the daily report or download it as PDF
    Report(commands::report::ReportArgs),

    /// Follow today's patient list until interrupted
    Watch(commands::watch::WatchArgs),
}
