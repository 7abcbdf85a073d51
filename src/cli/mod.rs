pub mod args;
pub mod config;
pub mod input;
pub mod loader;

pub use args::{Args, Backend, ExportFormat};
pub use config::ConfigFile;
pub use input::read_domains;
pub use loader::{Settings, SettingsLoader};
