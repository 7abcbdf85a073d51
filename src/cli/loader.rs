use std::time::Duration;

use reqwest::Url;

use crate::{
    error::ScoutError,
    net::{
        CachePolicy, DEFAULT_BATCH_SIZE, DEFAULT_MERGE_THRESHOLD, lookup::DEFAULT_DOH_ENDPOINT,
        lookup::DEFAULT_TIMEOUT,
    },
};

use super::{
    args::{Args, Backend},
    config::ConfigFile,
};

/// Effective settings after layering defaults, config file and CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: Backend,
    pub endpoint: String,
    pub timeout: Duration,
    pub cache: CachePolicy,
    pub batch_size: usize,
    pub merge_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache: CachePolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
        }
    }
}

impl Settings {
    /// Overlay values present in a config file
    pub fn merge_config(&mut self, config: ConfigFile) {
        if let Some(backend) = config.resolver.backend {
            self.backend = backend;
        }
        if let Some(endpoint) = config.resolver.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(secs) = config.resolver.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = config.cache.ttl_secs {
            self.cache.ttl = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = config.cache.negative_ttl_secs {
            self.cache.negative_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(size) = config.batch.size {
            self.batch_size = size;
        }
        if let Some(threshold) = config.subnet.merge_threshold {
            self.merge_threshold = threshold;
        }
    }

    /// Overlay values given on the command line
    pub fn merge_args(&mut self, args: &Args) {
        if let Some(backend) = args.backend {
            self.backend = backend;
        }
        if let Some(endpoint) = &args.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(secs) = args.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(size) = args.batch_size {
            self.batch_size = size;
        }
        if let Some(threshold) = args.merge_threshold {
            self.merge_threshold = threshold;
        }
    }

    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.batch_size == 0 {
            return Err(ScoutError::InvalidSetting {
                name: "batch size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.merge_threshold == 0 {
            return Err(ScoutError::InvalidSetting {
                name: "merge threshold",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ScoutError::InvalidSetting {
                name: "timeout",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.backend == Backend::Doh {
            Url::parse(self.endpoint.trim()).map_err(|err| ScoutError::InvalidSetting {
                name: "endpoint",
                reason: format!("'{}' is not a valid URL: {err}", self.endpoint),
            })?;
        }
        Ok(())
    }
}

/// Load and merge settings from command line arguments and config file
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load complete settings from CLI arguments
    pub fn load(args: &Args) -> Result<Settings, ScoutError> {
        let mut settings = Settings::default();

        // Load configuration file if specified
        if let Some(config_path) = args.config.as_ref() {
            let config = ConfigFile::load(config_path)?;
            settings.merge_config(config);
        }

        // Command line flags take precedence over the config file
        settings.merge_args(args);
        settings.validate()?;

        Ok(settings)
    }
}
