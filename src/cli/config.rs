use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

use super::args::Backend;

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub subnet: SubnetConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct ResolverConfig {
    pub backend: Option<Backend>,
    /// DNS-over-HTTPS JSON endpoint
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct CacheConfig {
    /// Lifetime of entries with addresses (absent: never expire)
    pub ttl_secs: Option<u64>,
    /// Lifetime of empty entries (absent: never expire)
    pub negative_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct BatchConfig {
    pub size: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct SubnetConfig {
    pub merge_threshold: Option<usize>,
}

impl ConfigFile {
    /// Load configuration file
    pub fn load(path: &Path) -> Result<Self, ScoutError> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ScoutError::ConfigParse {
            path: PathBuf::from(path),
            source,
        })
    }
}
