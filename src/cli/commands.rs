//! CLI commands

use crate::config::LytafConfig;
use crate::core::record::LytafSource;
use crate::core::temporal::Timestamp;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LYTAF CLI
#[derive(Parser)]
#[command(name = "lytaf")]
#[command(about = "Remove LYRA artifact periods from time series")]
pub struct Cli {
    /// JSON config file (falls back to $LYTAF_CONFIG, then defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn load_config(&self) -> crate::error::Result<LytafConfig> {
        match &self.config {
            Some(path) => LytafConfig::load(path),
            None => LytafConfig::from_env_or_default(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List merged annotation records in a time range
    Events {
        /// Range start
        #[arg(short, long)]
        start: Timestamp,
        /// Range end
        #[arg(short, long)]
        end: Timestamp,
        /// Comma-separated sources (lyra, manual, ppt, science)
        #[arg(long, value_delimiter = ',')]
        sources: Vec<LytafSource>,
        /// Write records to a CSV file instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show each source's event-type table
    Types {
        #[arg(long, value_delimiter = ',')]
        sources: Vec<LytafSource>,
    },
    /// Translate numeric LYRA event codes to names
    Translate {
        #[arg(required = true, allow_negative_numbers = true)]
        codes: Vec<i64>,
    },
    /// Import an annotation table from JSON into the local store
    Import {
        #[arg(long)]
        source: LytafSource,
        /// JSON file with `event_types` and `events` rows
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Remove artifact periods from a JSON series
    Filter {
        /// Series JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Artifacts to remove, e.g. "LAR, 'UV occ.', 5" or "*"
        #[arg(short, long)]
        artifacts: String,
        #[arg(long, value_delimiter = ',')]
        sources: Vec<LytafSource>,
        /// Print the artifact status report as JSON
        #[arg(long)]
        report: bool,
        /// Write the filtered series to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Split one channel of a JSON series into artifact-free segments
    Split {
        #[arg(short, long)]
        input: PathBuf,
        /// Channel name
        #[arg(short, long)]
        channel: String,
        #[arg(long, value_delimiter = ',')]
        sources: Vec<LytafSource>,
    },
}
