//! Integration Tests Module
//!
//! End-to-end coverage for the DeepTrust pipeline: provider fallback, the
//! orchestrator state machine, history aggregates and report export.
//! No network calls are made; providers are scripted in-process.

// Scripted providers and counting generator shared by the suites
mod support;

// Fallback chain ordering, skipping and timeouts
mod fallback_test;

// Orchestrator lifecycle, busy rejection and history writes
mod orchestrator_test;

// History aggregates over SQLite and in-memory backends
mod history_test;

// PDF and JSON snapshot export
mod report_test;
