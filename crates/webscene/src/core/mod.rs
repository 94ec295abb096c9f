//! # Core Module
//!
//! Configuration types and the process-wide settings provider that the
//! window coordinator depends on.

pub mod config;
pub mod context;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    BrowserSettings,
    LoggingConfig,
    OsrSettings,
    ViewportPolicy,
    WindowConfig,
    Config,
    ConfigError,
};
pub use context::MainContext;
