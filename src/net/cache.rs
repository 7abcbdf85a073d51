use std::{
    collections::HashMap,
    net::Ipv4Addr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use tokio::sync::OnceCell;

use super::{lookup::DnsLookup, subnet::parse_ipv4};

/// Expiry rules for cached lookups. `None` means the entry never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CachePolicy {
    /// Lifetime of entries holding at least one address
    pub ttl: Option<Duration>,
    /// Lifetime of negative (empty) entries
    pub negative_ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
struct Entry {
    ips: Vec<Ipv4Addr>,
    stored_at: Instant,
}

impl Entry {
    fn is_stale(&self, policy: &CachePolicy, now: Instant) -> bool {
        let ttl = if self.ips.is_empty() {
            policy.negative_ttl
        } else {
            policy.ttl
        };
        ttl.is_some_and(|ttl| now.saturating_duration_since(self.stored_at) >= ttl)
    }
}

/// One slot per domain. An uninitialised cell is a lookup in flight; every
/// caller for that domain awaits the same cell, so at most one external
/// request is outstanding per domain.
type Slot = Arc<OnceCell<Entry>>;

/// Memoizing front for a [`DnsLookup`] backend.
///
/// Failed lookups are cached as empty results (negative caching) and never
/// surface as errors to callers.
pub struct ResolutionCache<L: DnsLookup> {
    lookup: L,
    policy: CachePolicy,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<L: DnsLookup> ResolutionCache<L> {
    pub fn new(lookup: L) -> Self {
        Self::with_policy(lookup, CachePolicy::default())
    }

    pub fn with_policy(lookup: L, policy: CachePolicy) -> Self {
        Self {
            lookup,
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolve `domain` to its IPv4 addresses
    ///
    /// # Behavior
    /// 1. Returns the cached addresses when a fresh entry exists (no external call)
    /// 2. Joins the in-flight lookup when another caller is already resolving `domain`
    /// 3. Otherwise issues exactly one A-record query through the backend
    /// 4. Drops answers that are not valid dotted-quad addresses
    /// 5. Caches the result, including an empty one when the lookup failed
    ///
    /// # Arguments
    /// * `domain` - The domain name to resolve
    ///
    /// # Returns
    /// The valid IPv4 addresses for `domain`, possibly empty. Lookup failures
    /// are logged and reported as an empty list, never as an error.
    pub async fn resolve(&self, domain: &str) -> Vec<Ipv4Addr> {
        let slot = self.slot_for(domain);
        if slot.initialized() {
            log::debug!("cache hit for {domain}");
        } else if Arc::strong_count(&slot) > 2 {
            log::debug!("joining in-flight lookup for {domain}");
        }

        let entry = slot.get_or_init(|| self.fetch(domain)).await;
        entry.ips.clone()
    }

    /// Whether a fresh entry exists for `domain`. In-flight lookups do not count.
    pub fn has_cached(&self, domain: &str) -> bool {
        self.get_cached(domain).is_some()
    }

    /// Cached addresses for `domain` without triggering a lookup.
    pub fn get_cached(&self, domain: &str) -> Option<Vec<Ipv4Addr>> {
        let now = Instant::now();
        let slots = self.lock_slots();
        slots
            .get(domain)
            .and_then(|slot| slot.get())
            .filter(|entry| !entry.is_stale(&self.policy, now))
            .map(|entry| entry.ips.clone())
    }

    /// Drop every entry. Lookups already in flight complete for their current
    /// callers but their results are not kept.
    pub fn clear(&self) {
        let mut slots = self.lock_slots();
        log::debug!("clearing {} cache entries", slots.len());
        slots.clear();
    }

    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current slot for `domain`, replacing it first if its entry went stale.
    fn slot_for(&self, domain: &str) -> Slot {
        let now = Instant::now();
        let mut slots = self.lock_slots();
        let slot = slots.entry(domain.to_string()).or_default();
        if slot
            .get()
            .is_some_and(|entry| entry.is_stale(&self.policy, now))
        {
            log::debug!("cache entry for {domain} expired");
            *slot = Slot::default();
        }
        Arc::clone(slot)
    }

    async fn fetch(&self, domain: &str) -> Entry {
        let ips = match self.lookup.lookup_a(domain).await {
            Ok(answers) => {
                let total = answers.len();
                let ips: Vec<Ipv4Addr> = answers.iter().filter_map(|a| parse_ipv4(a)).collect();
                if ips.len() < total {
                    log::debug!("dropped {} invalid answers for {domain}", total - ips.len());
                }
                ips
            }
            Err(err) => {
                log::warn!("DNS resolve failed for {domain}: {err}");
                Vec::new()
            }
        };

        Entry {
            ips,
            stored_at: Instant::now(),
        }
    }
}
