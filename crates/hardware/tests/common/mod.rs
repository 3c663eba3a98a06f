//! Shared test infrastructure.

/// Fluent builders for trace records.
pub mod builder;
