//! Functional units used by the core and the memory hierarchy.

/// Branch direction predictors.
pub mod bru;

/// Set-associative cache with MSHR and replacement policies.
pub mod cache;

/// Hardware prefetcher implementations (FDIP, next-line, stride).
pub mod prefetch;
