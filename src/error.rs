use thiserror::Error;

use std::path::PathBuf;

use hickory_resolver::ResolveError;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("HTTP request to resolution service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("resolution service returned HTTP {status} for {domain}")]
    HttpStatus { domain: String, status: u16 },

    #[error("failed to initialize DNS resolver: {source}")]
    DnsResolverInit {
        #[source]
        source: ResolveError,
    },

    #[error("failed to resolve domain {domain}: {source}")]
    DnsLookup {
        domain: String,
        #[source]
        source: ResolveError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}
