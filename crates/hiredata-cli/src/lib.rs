//! Hiredata CLI Library
//!
//! Command-line client for the Hiredata server.
//!
//! - **Upload**: send CSV files for ingestion (`hiredata upload`)
//! - **Backup / Restore**: snapshot every table, or replace one table from
//!   its snapshot (`hiredata backup`, `hiredata restore <table>`)
//! - **Reports**: print the hiring reports (`hiredata report`)
//! - **Status**: check server health (`hiredata status`)

pub mod api;
pub mod commands;
pub mod error;

pub use error::{CliError, Result};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Hiredata - client for the hiring data service
#[derive(Parser, Debug)]
#[command(name = "hiredata")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(
        long,
        env = "HIREDATA_SERVER_URL",
        default_value = api::client::DEFAULT_SERVER_URL,
        global = true
    )]
    pub server_url: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload CSV files (hired_employees, departments, jobs)
    Upload {
        /// CSV files; each file's name selects its table
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Back up every table to Parquet
    Backup,

    /// Replace a table with its latest backup
    Restore {
        /// Table to restore (hired_employees, departments or jobs)
        table: String,
    },

    /// Print an analytic report
    Report {
        #[arg(value_enum)]
        kind: ReportKind,

        /// Report year (server default when omitted)
        #[arg(short, long)]
        year: Option<i32>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check server health
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// Hires per quarter by department and job
    HiresPerQuarter,
    /// Departments hiring above the mean
    DepartmentsAboveMean,
}
