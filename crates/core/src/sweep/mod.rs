//! Enumeration, batched trashing and run orchestration

pub mod engine;
pub mod enumerator;
pub mod preview;
pub mod progress;
pub mod service;

pub use engine::{BatchEngine, EngineConfig};
pub use enumerator::Enumerator;
pub use preview::PreviewService;
pub use progress::{NoProgress, ProgressObserver, ProgressTracker};
pub use service::{Discovery, SweepService};
