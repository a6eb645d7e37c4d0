//! Feature implementations for sakani.
//!
//! - Offline action queue with connectivity-driven replay

pub mod sync;
