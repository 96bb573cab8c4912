//! Resource extraction engine
//!
//! The cycle, run once per process in a background task: graduate a
//! pending patch, check the freshness token, and on staleness wipe the
//! cache and repopulate it from the override archive and then the
//! baseline bundle, finishing with a fresh token. Failures never leave
//! a partial cache behind.

pub mod coordinator;
pub mod freshness;
pub mod passes;

pub use coordinator::ResourceExtractor;
pub use freshness::{Freshness, TOKEN_PREFIX};
