use std::{collections::HashMap, net::Ipv4Addr};

use futures::future::join_all;

use super::{cache::ResolutionCache, lookup::DnsLookup};

/// Default number of domains resolved concurrently per chunk
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Resolve many domains through `cache`, one chunk at a time.
///
/// The input is split, in order, into chunks of at most `batch_size`
/// domains. All lookups in a chunk are in flight together and the chunk must
/// finish before the next one starts. `on_progress(processed, total)` fires
/// after every chunk with the cumulative count of finished domains.
///
/// A `batch_size` of zero is treated as one.
pub async fn resolve_batch<L, F>(
    cache: &ResolutionCache<L>,
    domains: &[String],
    batch_size: usize,
    mut on_progress: F,
) -> HashMap<String, Vec<Ipv4Addr>>
where
    L: DnsLookup,
    F: FnMut(usize, usize),
{
    let total = domains.len();
    let batch_size = batch_size.max(1);
    let mut results = HashMap::with_capacity(total);
    let mut processed = 0;

    for (index, chunk) in domains.chunks(batch_size).enumerate() {
        log::debug!("resolving chunk {} ({} domains)", index + 1, chunk.len());

        let resolved = join_all(chunk.iter().map(|domain| cache.resolve(domain))).await;
        for (domain, ips) in chunk.iter().zip(resolved) {
            results.insert(domain.clone(), ips);
        }

        processed = (processed + chunk.len()).min(total);
        on_progress(processed, total);
    }

    results
}
