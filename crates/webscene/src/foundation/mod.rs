//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Window and popup geometry
//! - Logging utilities

pub mod geometry;
pub mod logging;
