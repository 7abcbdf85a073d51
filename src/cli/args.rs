use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Which service answers A-record queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// DNS-over-HTTPS JSON API
    #[default]
    Doh,
    /// The host's configured nameservers
    System,
}

/// Export artifact written on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// `// domain` blocks of aggregated CIDR subnets
    #[default]
    Subnets,
    /// Observed domain names, one per line
    Domains,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Resolve domain names and aggregate their IPv4 addresses into CIDR allowlists"
)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read observed domains from a file, one per line ('-' for stdin)
    #[arg(long = "input", short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write the export to a file instead of stdout
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Export to produce
    #[arg(long = "format", value_enum, default_value_t = ExportFormat::Subnets)]
    pub format: ExportFormat,

    /// Resolution backend
    #[arg(long = "backend", value_enum)]
    pub backend: Option<Backend>,

    /// DNS-over-HTTPS JSON endpoint
    #[arg(long = "endpoint", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Transport timeout for the DoH backend, in seconds
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Number of domains resolved concurrently per chunk
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Distinct /24 networks under one /16 needed to collapse into the /16
    #[arg(long = "merge-threshold", value_name = "N")]
    pub merge_threshold: Option<usize>,

    /// Observed domains (each occurrence counts as one request)
    pub domains: Vec<String>,
}
