pub mod config;
pub mod events;
pub mod merger;
pub mod orchestrator;
pub mod report;

pub use config::{ReconConfig, RunSettings};
pub use events::EventSink;
pub use orchestrator::{run, spawn_run};
