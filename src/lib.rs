pub mod cli;
pub mod error;
pub mod export;
pub mod net;
pub mod registry;
pub mod session;

pub use error::ScoutError;
pub use registry::{DomainRecord, DomainRegistry, RegistryStats, ResolveStatus};
pub use session::Session;
