//! Process-wide settings provider
//!
//! One [`MainContext`] exists per process. It is created from the loaded
//! [`ApplicationConfig`] and shared (by `Rc`) with every session the window
//! manager creates.

use crate::core::config::{ApplicationConfig, BrowserSettings, OsrSettings, WindowConfig};

/// Process-wide settings provider
#[derive(Debug, Clone)]
pub struct MainContext {
    config: ApplicationConfig,
}

impl MainContext {
    /// Create the context from a loaded configuration
    pub fn new(config: ApplicationConfig) -> Self {
        log::debug!(
            "Main context: startup_url={}, osr frame rate={}",
            config.startup_url,
            config.osr.windowless_frame_rate
        );
        Self { config }
    }

    /// Copy of the off-screen rendering settings for a new content session
    pub fn populate_osr_settings(&self) -> OsrSettings {
        self.config.osr.clone()
    }

    /// Default settings for new browsers
    pub fn browser_settings(&self) -> &BrowserSettings {
        &self.config.browser
    }

    /// Window defaults
    pub fn window_config(&self) -> &WindowConfig {
        &self.config.window
    }

    /// URL loaded by the first window
    pub fn startup_url(&self) -> &str {
        &self.config.startup_url
    }

    /// Whether each session gets its own request context
    pub fn request_context_per_session(&self) -> bool {
        self.config.request_context_per_session
    }

    /// The full configuration
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }
}

impl Default for MainContext {
    fn default() -> Self {
        Self::new(ApplicationConfig::default())
    }
}
