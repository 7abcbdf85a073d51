use std::{net::IpAddr, time::Duration};

use async_trait::async_trait;
use hickory_resolver::{Resolver, TokioResolver};
use serde::Deserialize;

#[cfg(test)]
use mockall::automock;

use crate::error::ScoutError;

/// Public DNS-over-HTTPS JSON endpoint used when none is configured.
pub const DEFAULT_DOH_ENDPOINT: &str = "https://dns.google/resolve";

/// Default transport timeout for the DoH backend
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// DNS record type code for an A record
const RECORD_TYPE_A: u16 = 1;

/// DNS A-record lookup abstraction for testing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DnsLookup: Send + Sync + 'static {
    /// Issue a single A-record query for a domain
    ///
    /// Implementations return the raw answer data exactly as the service
    /// reported it. Validation and caching are left to
    /// [`ResolutionCache`](super::cache::ResolutionCache).
    ///
    /// # Arguments
    /// * `domain` - The domain name to query
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Address strings from the A answers (may be empty)
    /// * `Err(ScoutError)` - If the service could not be reached or answered
    ///   with an error
    async fn lookup_a(&self, domain: &str) -> Result<Vec<String>, ScoutError>;
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

/// Resolver backed by a DNS-over-HTTPS JSON API
///
/// Sends `GET <endpoint>?name=<domain>&type=A` and keeps the `data` field of
/// every `Answer` entry with `type == 1`. A missing `Answer` array means no
/// addresses. Non-2xx statuses are reported as [`ScoutError::HttpStatus`].
///
/// # Examples
/// ```no_run
/// use std::time::Duration;
/// use cidrscout::net::{DnsLookup, DohLookup};
///
/// # async fn example() {
/// let lookup = DohLookup::new("https://dns.google/resolve", Duration::from_secs(10)).unwrap();
/// let answers = lookup.lookup_a("example.com").await.unwrap();
/// # }
/// ```
pub struct DohLookup {
    http: reqwest::Client,
    endpoint: String,
}

impl DohLookup {
    /// Build a client for `endpoint` with the given transport timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ScoutError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cidrscout/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DnsLookup for DohLookup {
    async fn lookup_a(&self, domain: &str) -> Result<Vec<String>, ScoutError> {
        log::debug!("GET {} name={domain} type=A", self.endpoint);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("name", domain), ("type", "A")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::HttpStatus {
                domain: domain.to_string(),
                status: status.as_u16(),
            });
        }

        let body: DohResponse = response.json().await?;
        Ok(body
            .answer
            .into_iter()
            .filter(|answer| answer.record_type == RECORD_TYPE_A)
            .map(|answer| answer.data)
            .collect())
    }
}

/// Resolver using the host's configured nameservers
pub struct SystemLookup {
    resolver: TokioResolver,
}

impl SystemLookup {
    pub fn new() -> Result<Self, ScoutError> {
        let resolver = Resolver::builder_tokio()
            .map_err(|source| ScoutError::DnsResolverInit { source })?
            .build();
        Ok(Self { resolver })
    }
}

#[async_trait]
impl DnsLookup for SystemLookup {
    async fn lookup_a(&self, domain: &str) -> Result<Vec<String>, ScoutError> {
        let response = self
            .resolver
            .lookup_ip(domain)
            .await
            .map_err(|source| ScoutError::DnsLookup {
                domain: domain.to_string(),
                source,
            })?;

        Ok(response
            .iter()
            .filter_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4.to_string()),
                IpAddr::V6(_) => None,
            })
            .collect())
    }
}
