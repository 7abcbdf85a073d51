use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    net::Ipv4Addr,
};

use crate::net::subnet::{DEFAULT_MERGE_THRESHOLD, Subnet, insert_and_merge};

/// Resolution state of one observed domain. `Resolved` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStatus {
    #[default]
    Pending,
    Resolved,
    Failed,
}

/// Aggregate state for one observed domain
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomainRecord {
    pub domain: String,
    pub ips: BTreeSet<Ipv4Addr>,
    /// Minimal `/24`/`/16` cover of `ips`
    pub subnets: BTreeSet<Subnet>,
    pub request_count: u64,
    pub status: ResolveStatus,
}

impl DomainRecord {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Add `ip` and fold its `/24` into the subnet set, collapsing the
    /// affected `/16` group once it reaches `merge_threshold` members.
    pub fn add_ip(&mut self, ip: Ipv4Addr, merge_threshold: usize) {
        self.ips.insert(ip);
        insert_and_merge(&mut self.subnets, Subnet::slash24(ip), merge_threshold);
    }
}

/// Counters summarising a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    pub total_requests: u64,
    pub unique_domains: usize,
    pub resolved_ips: usize,
}

/// Per-domain records fed by observed requests and resolution results
#[derive(Debug, Clone, PartialEq)]
pub struct DomainRegistry {
    records: BTreeMap<String, DomainRecord>,
    total_requests: u64,
    merge_threshold: usize,
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MERGE_THRESHOLD)
    }
}

impl DomainRegistry {
    pub fn new(merge_threshold: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            total_requests: 0,
            merge_threshold,
        }
    }

    pub fn merge_threshold(&self) -> usize {
        self.merge_threshold
    }

    /// Record one observed request for `domain`, creating a pending record on
    /// first sight.
    pub fn observe(&mut self, domain: &str) {
        let record = self
            .records
            .entry(domain.to_string())
            .or_insert_with(|| DomainRecord::new(domain));
        record.request_count += 1;
        self.total_requests += 1;
    }

    /// Domains that have not been through a resolution attempt, in lexical order
    pub fn pending_domains(&self) -> Vec<String> {
        self.records
            .values()
            .filter(|record| record.status == ResolveStatus::Pending)
            .map(|record| record.domain.clone())
            .collect()
    }

    /// Apply the outcome of a resolution attempt.
    ///
    /// Only pending records change. The record becomes `Resolved` when at
    /// least one address was added, `Failed` otherwise. Unknown domains are
    /// ignored.
    pub fn apply_resolution(&mut self, domain: &str, ips: &[Ipv4Addr]) {
        let Some(record) = self.records.get_mut(domain) else {
            log::debug!("ignoring resolution for unobserved domain {domain}");
            return;
        };
        if record.status != ResolveStatus::Pending {
            return;
        }

        for ip in ips {
            record.add_ip(*ip, self.merge_threshold);
        }
        record.status = if ips.is_empty() {
            ResolveStatus::Failed
        } else {
            ResolveStatus::Resolved
        };
        log::debug!(
            "{domain}: {:?} with {} IPs, {} subnets",
            record.status,
            record.ips.len(),
            record.subnets.len()
        );
    }

    pub fn apply_results(&mut self, results: &HashMap<String, Vec<Ipv4Addr>>) {
        for (domain, ips) in results {
            self.apply_resolution(domain, ips);
        }
    }

    pub fn get(&self, domain: &str) -> Option<&DomainRecord> {
        self.records.get(domain)
    }

    /// Records in lexical domain order
    pub fn records(&self) -> impl Iterator<Item = &DomainRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_requests: self.total_requests,
            unique_domains: self.records.len(),
            resolved_ips: self.records.values().map(|r| r.ips.len()).sum(),
        }
    }

    /// Discard every record and reset counters
    pub fn clear(&mut self) {
        self.records.clear();
        self.total_requests = 0;
    }
}
