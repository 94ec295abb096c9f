//! # Unified Configuration System
//!
//! All configuration structures used by the window coordinator and the
//! off-screen renderer live here. Every type is serializable so a whole
//! [`ApplicationConfig`] can be read from a TOML or RON file.
//!
//! ## Configuration Categories
//!
//! - **Logging**: Default log filter
//! - **OSR Settings**: Process-wide off-screen rendering parameters
//! - **Browser Settings**: Per-browser defaults handed to the content engine
//! - **Window Config**: Default viewport and how realized surfaces are sized

use serde::{Serialize, Deserialize};

use crate::foundation::geometry::Bounds;

pub use crate::config::{Config, ConfigError};

/// Default viewport used when no usable bounds are available
pub const DEFAULT_VIEWPORT: Bounds = Bounds::new(0, 0, 800, 600);

/// # Logging Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter (`RUST_LOG` overrides it)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// # Off-screen Rendering Settings
///
/// Process-wide parameters for off-screen rendered browsers. Sessions never
/// read these directly; they ask the [`MainContext`](crate::core::context::MainContext)
/// to populate a copy when their content session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrSettings {
    /// Render with a transparent background
    pub transparent_painting: bool,
    /// Outline the dirty rectangle of every paint
    pub show_update_rect: bool,
    /// Background color (ARGB) used when painting is opaque
    pub background_color: u32,
    /// Share GPU textures with the host instead of copying pixel buffers
    pub shared_texture: bool,
    /// Drive frames from the host render loop instead of an internal timer
    pub external_begin_frame: bool,
    /// Frame rate for windowless rendering
    pub windowless_frame_rate: u32,
}

impl OsrSettings {
    /// Enable or disable transparent painting
    pub fn with_transparent_painting(mut self, enabled: bool) -> Self {
        self.transparent_painting = enabled;
        self
    }

    /// Set the windowless frame rate
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.windowless_frame_rate = frame_rate;
        self
    }

    /// Set the opaque background color
    pub fn with_background_color(mut self, argb: u32) -> Self {
        self.background_color = argb;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=240).contains(&self.windowless_frame_rate) {
            return Err(format!(
                "Windowless frame rate must be between 1 and 240, got {}",
                self.windowless_frame_rate
            ));
        }
        Ok(())
    }
}

impl Default for OsrSettings {
    fn default() -> Self {
        Self {
            transparent_painting: false,
            show_update_rect: false,
            background_color: 0xFFFF_FFFF,
            shared_texture: false,
            external_begin_frame: false,
            windowless_frame_rate: 30,
        }
    }
}

/// # Browser Settings
///
/// Per-browser defaults forwarded to the content engine when a browser is
/// created. Unset options leave the engine default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Frame rate override for this browser
    pub windowless_frame_rate: Option<u32>,
    /// Background color override (ARGB)
    pub background_color: Option<u32>,
    /// Whether JavaScript may run
    pub javascript_disabled: bool,
    /// Default text encoding
    pub default_encoding: Option<String>,
}

/// How a realized display surface and its browser are sized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportPolicy {
    /// Use the bounds stored at initialization
    #[default]
    StoredBounds,
    /// Always use the configured default viewport
    FixedDefault,
}

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Viewport used for `FixedDefault` and when stored bounds are empty
    pub default_viewport: Bounds,
    /// How realized surfaces are sized
    pub viewport_policy: ViewportPolicy,
    /// Render browsers off-screen
    pub with_osr: bool,
    /// Initial bounds for top-level (non-popup) windows
    pub initial_bounds: Bounds,
}

impl WindowConfig {
    /// Set the viewport policy
    pub fn with_viewport_policy(mut self, policy: ViewportPolicy) -> Self {
        self.viewport_policy = policy;
        self
    }

    /// Set the initial bounds of top-level windows
    pub fn with_initial_bounds(mut self, bounds: Bounds) -> Self {
        self.initial_bounds = bounds;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_viewport.is_empty() {
            return Err("Default viewport must have a non-zero size".to_string());
        }
        if !self.with_osr {
            return Err("Only off-screen rendering is supported".to_string());
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_viewport: DEFAULT_VIEWPORT,
            viewport_policy: ViewportPolicy::default(),
            with_osr: true,
            initial_bounds: Bounds::new(100, 100, 1280, 720),
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses every subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Off-screen rendering settings
    pub osr: OsrSettings,
    /// Browser defaults
    pub browser: BrowserSettings,
    /// Window defaults
    pub window: WindowConfig,
    /// URL loaded by the first window
    pub startup_url: String,
    /// Give every session its own request context instead of sharing one
    pub request_context_per_session: bool,
}

impl ApplicationConfig {
    /// Create a new configuration with defaults and the given startup URL
    pub fn new(startup_url: impl Into<String>) -> Self {
        Self {
            startup_url: startup_url.into(),
            ..Self::default()
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.osr.validate().map_err(ConfigError::Invalid)?;
        self.window.validate().map_err(ConfigError::Invalid)?;
        if self.startup_url.is_empty() {
            return Err(ConfigError::Invalid("Startup URL cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            osr: OsrSettings::default(),
            browser: BrowserSettings::default(),
            window: WindowConfig::default(),
            startup_url: "about:blank".to_string(),
            request_context_per_session: false,
        }
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ApplicationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_frame_rate_validation() {
        let osr = OsrSettings::default().with_frame_rate(0);
        assert!(osr.validate().is_err());

        let osr = OsrSettings::default().with_frame_rate(60);
        assert!(osr.validate().is_ok());
    }

    #[test]
    fn test_windowed_rendering_rejected() {
        let mut config = ApplicationConfig::default();
        config.window.with_osr = false;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ApplicationConfig = toml::from_str(
            r#"
            startup_url = "https://example.com"

            [osr]
            windowless_frame_rate = 60

            [window]
            viewport_policy = "FixedDefault"
            "#,
        )
        .unwrap();

        assert_eq!(config.startup_url, "https://example.com");
        assert_eq!(config.osr.windowless_frame_rate, 60);
        assert_eq!(config.osr.background_color, 0xFFFF_FFFF);
        assert_eq!(config.window.viewport_policy, ViewportPolicy::FixedDefault);
        assert_eq!(config.window.default_viewport, DEFAULT_VIEWPORT);
    }
}
