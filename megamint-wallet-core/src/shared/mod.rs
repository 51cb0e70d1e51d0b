//! Shared utilities and types
//!
//! Error types, protocol constants and wallet event types used throughout
//! the wallet core.

pub mod constants;
pub mod error;
pub mod types;
