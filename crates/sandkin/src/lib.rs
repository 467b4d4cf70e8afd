//! Headless front end for the Sandkin world: layered configuration,
//! terrain presets, sandbox and training loops, and PNG snapshots.

pub mod config;
pub mod runner;
pub mod scenario;
pub mod snapshot;

pub use config::AppConfig;
pub use scenario::Scenario;
