//! Foundation module - core utilities and types
//!
//! Fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Logging setup

pub mod logging;
pub mod math;
