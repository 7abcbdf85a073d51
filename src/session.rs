use crate::{
    net::{DnsLookup, ResolutionCache, resolve_batch},
    registry::{DomainRegistry, RegistryStats},
};

/// One resolution session: the cache, the registry it feeds, and the batch
/// size used to drive lookups. Callers build one per session and pass it
/// around; nothing is global.
pub struct Session<L: DnsLookup> {
    cache: ResolutionCache<L>,
    registry: DomainRegistry,
    batch_size: usize,
}

impl<L: DnsLookup> Session<L> {
    pub fn new(cache: ResolutionCache<L>, registry: DomainRegistry, batch_size: usize) -> Self {
        Self {
            cache,
            registry,
            batch_size,
        }
    }

    pub fn observe(&mut self, domain: &str) {
        self.registry.observe(domain);
    }

    /// Resolve every pending domain and fold the results into the registry.
    ///
    /// Domains that already left `pending` are not looked up again.
    pub async fn resolve_pending<F>(&mut self, on_progress: F) -> RegistryStats
    where
        F: FnMut(usize, usize),
    {
        let pending = self.registry.pending_domains();
        if pending.is_empty() {
            log::debug!("no pending domains to resolve");
            return self.registry.stats();
        }

        log::info!("resolving {} domains", pending.len());
        let results = resolve_batch(&self.cache, &pending, self.batch_size, on_progress).await;
        self.registry.apply_results(&results);
        self.registry.stats()
    }

    /// Reset the registry and the cache together
    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.cache.clear();
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResolutionCache<L> {
        &self.cache
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{net::lookup::MockDnsLookup, registry::ResolveStatus};

    fn session(lookup: MockDnsLookup) -> Session<MockDnsLookup> {
        Session::new(ResolutionCache::new(lookup), DomainRegistry::default(), 10)
    }

    #[tokio::test]
    async fn resolve_pending_updates_registry() {
        let mut lookup = MockDnsLookup::new();
        lookup.expect_lookup_a().times(2).returning(|domain| {
            Ok(match domain {
                "ok.example" => vec!["192.0.2.1".to_string()],
                _ => vec![],
            })
        });
        let mut session = session(lookup);
        session.observe("ok.example");
        session.observe("nx.example");

        let stats = session.resolve_pending(|_, _| {}).await;

        assert_eq!(stats.resolved_ips, 1);
        let registry = session.registry();
        assert_eq!(registry.get("ok.example").unwrap().status, ResolveStatus::Resolved);
        assert_eq!(registry.get("nx.example").unwrap().status, ResolveStatus::Failed);
    }

    #[tokio::test]
    async fn settled_domains_are_not_resolved_again() {
        let mut lookup = MockDnsLookup::new();
        lookup
            .expect_lookup_a()
            .times(2)
            .returning(|_| Ok(vec!["192.0.2.1".to_string()]));
        let mut session = session(lookup);

        session.observe("first.example");
        session.resolve_pending(|_, _| {}).await;

        session.observe("first.example");
        session.observe("second.example");
        let mut progress = Vec::new();
        session.resolve_pending(|done, total| progress.push((done, total))).await;

        assert_eq!(progress, vec![(1, 1)]);
        assert_eq!(session.registry().get("first.example").unwrap().request_count, 2);
    }

    #[tokio::test]
    async fn clear_all_resets_cache_and_registry() {
        let mut lookup = MockDnsLookup::new();
        lookup
            .expect_lookup_a()
            .times(2)
            .returning(|_| Ok(vec!["192.0.2.1".to_string()]));
        let mut session = session(lookup);

        session.observe("example.com");
        session.resolve_pending(|_, _| {}).await;
        session.clear_all();

        assert!(session.registry().is_empty());
        assert!(session.cache().is_empty());

        session.observe("example.com");
        session.resolve_pending(|_, _| {}).await;
        assert_eq!(
            session.registry().get("example.com").unwrap().status,
            ResolveStatus::Resolved
        );
    }
}
