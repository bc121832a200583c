/*
[INPUT]:  Public API exports for woostream crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod format;
pub mod notifier;
pub mod runner;

// Re-export main types for convenience
pub use config::{AppConfig, CliOverrides, FileConfig, ReconnectConfig, TelegramConfig};
pub use notifier::{Broadcaster, ConsoleNotifier, Notifier, TelegramNotifier};
pub use runner::{Runner, fetch_snapshot};
