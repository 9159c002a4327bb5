//! Analysis Fallback Chain Service
//!
//! Provides tiered provider execution that always ends in a result.

mod chain;

pub use chain::{
    AttemptOutcome, ChainOutcome, ChainSettings, FallbackAttempt, FallbackChain,
    FallbackExecutionLog, DEFAULT_ATTEMPT_TIMEOUT,
};
