pub mod batch;
pub mod cache;
pub mod lookup;
pub mod subnet;

// Re-export main types and functions
pub use batch::{DEFAULT_BATCH_SIZE, resolve_batch};
pub use cache::{CachePolicy, ResolutionCache};
pub use lookup::{DnsLookup, DohLookup, SystemLookup};
pub use subnet::{
    DEFAULT_MERGE_THRESHOLD, Subnet, is_valid_ip, merge_subnets, sort_subnets, to_subnet24,
};
