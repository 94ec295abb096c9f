//! Embedded content engine interface
//!
//! The browser engine itself is an external collaborator. This module
//! defines the slice of it the window coordinator talks to: a
//! [`ContentSession`] per window (the engine's off-screen browser wrapper)
//! and a [`ContentSessionFactory`] that builds them.
//!
//! Engine implementations report creation and teardown back to the
//! coordinator by posting [`ControlTask`](crate::control::ControlTask)s; they
//! never call into a session from their own threads.

use serde::{Serialize, Deserialize};

use crate::core::config::{BrowserSettings, OsrSettings};
use crate::foundation::geometry::Rect;
use crate::session::SessionId;
use crate::surface::SurfaceHandle;

/// Engine-assigned browser identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowserId(pub u32);

/// Request context (cookie jar, cache) a browser is created in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Context identifier
    pub id: u32,
    /// Whether the context is shared by every session
    pub shared: bool,
}

/// Page loading state reported by content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingState {
    /// A navigation is in progress
    pub is_loading: bool,
    /// History allows going back
    pub can_go_back: bool,
    /// History allows going forward
    pub can_go_forward: bool,
}

/// Client that receives a popup browser's callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRef(pub SessionId);

/// How the engine should host a not-yet-created browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Surface the browser is (temporarily) parented to
    pub parent: Option<SurfaceHandle>,
    /// Render off-screen
    pub windowless: bool,
    /// Frame rate for windowless rendering
    pub windowless_frame_rate: u32,
}

/// Popup configuration handed back to the engine
///
/// Returned when a session is initialized as a popup; the engine creates the
/// popup browser with these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupConfig {
    /// Hosting parameters
    pub window_info: WindowInfo,
    /// Client for the popup browser
    pub client: ClientRef,
    /// Browser settings for the popup
    pub settings: BrowserSettings,
}

/// One embedded content-rendering session (an off-screen browser wrapper)
pub trait ContentSession {
    /// Start creating the browser
    ///
    /// Creation is asynchronous; the engine posts
    /// `ControlTask::ContentSessionReady` once the browser exists.
    fn create_browser(
        &mut self,
        parent: Option<SurfaceHandle>,
        rect: Rect,
        settings: &BrowserSettings,
        request_context: Option<RequestContext>,
    );

    /// Describe how the engine should host a popup before it has a real parent
    fn popup_config(&self, temporary_parent: SurfaceHandle) -> PopupConfig;

    /// Show an already-created popup browser under `parent` at `rect`
    fn show_popup(&mut self, parent: Option<SurfaceHandle>, rect: Rect);

    /// The browser, once the engine has created it
    fn browser(&self) -> Option<BrowserId>;

    /// Ask the browser to close
    ///
    /// A non-forced close runs unload handlers and may be cancelled by
    /// content. Completion is reported with `ControlTask::ContentSessionDestroyed`.
    fn close_browser(&mut self, force: bool);

    /// Whether a close is already in progress
    fn is_closing(&self) -> bool;

    /// Set the device scale factor used for rendering
    fn set_device_scale_factor(&mut self, scale: f32);

    /// Device scale factor used for rendering
    fn device_scale_factor(&self) -> f32;

    /// Give or take keyboard focus
    fn set_focus(&mut self, focus: bool);

    /// Tell the browser its host surface started moving or resizing
    fn notify_move_or_resize_started(&mut self);

    /// Tell the browser its view size changed
    fn resize(&mut self, width: i32, height: i32);
}

/// Builds content sessions for new windows
pub trait ContentSessionFactory {
    /// Create the off-screen content session owned by `session`
    fn create(&self, session: SessionId, startup_url: &str, settings: OsrSettings) -> Box<dyn ContentSession>;
}
