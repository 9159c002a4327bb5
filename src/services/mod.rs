//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod fallback;
pub mod history;
pub mod orchestrator;
pub mod progress;
pub mod report;

pub use fallback::{ChainSettings, FallbackChain};
pub use history::{HistoryStore, HistorySummary, MediaFilter};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
pub use progress::{AnalysisPhase, ProgressSimulator, ProgressState, ProgressTracker};
pub use report::{ReportGenerator, RenderError};
