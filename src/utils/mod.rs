//! Utility functions and data structures
//!
//! This module provides helpers for:
//! - Reading reviews and writing pipeline output
//! - Topic model evaluation

pub mod evaluation;
pub mod io;
