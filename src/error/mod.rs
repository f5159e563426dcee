//! The unified error handling system for the cache.

// 1. Core Types
pub use backend::{BackendError, BackendResult};
pub use types::CacheError;

/// A unified `Result` type for the public cache API.
///
/// Validation and construction failures use this type; runtime backend
/// failures are reported through `false` returns instead.
pub type Result<T> = std::result::Result<T, CacheError>;

// 2. Module declarations
pub mod backend;
pub mod macros;
pub mod types;

#[cfg(test)]
mod tests;
