//! Root window lifecycle coordinator
//!
//! [`WindowSession`] owns a content session and (once realized) a display
//! surface. Creation is driven by the owner (`initialize` /
//! `initialize_as_popup`), teardown by callbacks from the engine and the
//! windowing layer. Callbacks are expected on the control thread; engine
//! threads reach it by posting `ControlTask`s.

use std::rc::Rc;

use crate::browser::{BrowserId, ContentSession, LoadingState, PopupConfig};
use crate::control::ControlTask;
use crate::core::config::{BrowserSettings, ViewportPolicy};
use crate::foundation::geometry::{Bounds, PopupFeatures, Rect};
use crate::session::content::create_content_session;
use crate::session::teardown::{LifecycleState, TeardownFlags, TeardownJoin};
use crate::session::{SessionDelegate, SessionError, SessionId, SessionServices};
use crate::surface::{DisplaySurface, ShowMode, SurfaceHandle};

/// One logical window: a display surface paired with a content session
pub struct WindowSession {
    id: SessionId,
    services: Rc<SessionServices>,
    delegate: Option<Rc<dyn SessionDelegate>>,

    with_osr: bool,
    is_popup: bool,
    bounds: Rect,

    content: Option<Box<dyn ContentSession>>,
    surface: Option<Box<dyn DisplaySurface>>,
    realized: bool,
    surface_close_forced: bool,
    // SURFACE was marked without the windowing layer reporting it
    surface_implied: bool,

    initialized: bool,
    teardown: TeardownJoin,

    address: String,
    title: String,
    loading: LoadingState,
    fullscreen: bool,
}

impl WindowSession {
    /// Create an uninitialized session
    pub fn new(id: SessionId, services: Rc<SessionServices>) -> Self {
        Self {
            id,
            services,
            delegate: None,
            with_osr: false,
            is_popup: false,
            bounds: Rect::default(),
            content: None,
            surface: None,
            realized: false,
            surface_close_forced: false,
            surface_implied: false,
            initialized: false,
            teardown: TeardownJoin::new(),
            address: String::new(),
            title: String::new(),
            loading: LoadingState::default(),
            fullscreen: false,
        }
    }

    /// Initialize as a top-level window
    ///
    /// Creates the content session, then realizes the display surface on the
    /// control thread: right away when called there, otherwise by posting
    /// `ControlTask::RealizeDisplaySurface`.
    ///
    /// A session shares its services through `Rc`, so it is not `Send` and
    /// this is always called on the thread that owns it. The posting branch
    /// only runs when that thread is not (yet) the designated control thread,
    /// e.g. before [`ControlThread::rebind_to_current`](crate::control::ControlThread::rebind_to_current)
    /// hands the role over.
    ///
    /// # Panics
    /// Panics if the session is already initialized or `with_osr` is false.
    pub fn initialize(
        &mut self,
        delegate: Rc<dyn SessionDelegate>,
        with_osr: bool,
        bounds: Bounds,
        settings: BrowserSettings,
        startup_url: &str,
    ) {
        assert!(!self.initialized, "window session {:?} initialized twice", self.id);

        self.delegate = Some(delegate);
        self.with_osr = with_osr;
        self.bounds = Rect::from_bounds(bounds);

        self.content = Some(create_content_session(&self.services, self.id, with_osr, startup_url));
        self.initialized = true;

        log::info!("Window session {:?} initialized at {:?}", self.id, self.bounds);

        if self.services.control.is_current() {
            if let Err(err) = self.realize_display_surface(&settings) {
                log::error!("Window session {:?}: {}", self.id, err);
            }
        } else {
            log::debug!("Deferring realization of {:?} to the control thread", self.id);
            self.services.control.post(ControlTask::RealizeDisplaySurface {
                session: self.id,
                settings,
            });
        }
    }

    /// Initialize as a popup opened by existing content
    ///
    /// Only the geometry fields the popup request set are applied. The
    /// returned configuration tells the engine how to host the popup browser
    /// until its own display surface exists; the surface is realized in
    /// [`on_content_session_ready`](Self::on_content_session_ready).
    ///
    /// # Panics
    /// Panics if the session is already initialized or `with_osr` is false.
    pub fn initialize_as_popup(
        &mut self,
        delegate: Rc<dyn SessionDelegate>,
        with_osr: bool,
        features: &PopupFeatures,
    ) -> PopupConfig {
        assert!(!self.initialized, "window session {:?} initialized twice", self.id);

        self.delegate = Some(delegate);
        self.with_osr = with_osr;
        self.is_popup = true;
        self.bounds.apply_popup_features(features);

        let content = create_content_session(&self.services, self.id, with_osr, "");
        self.initialized = true;

        let placeholder = self.services.surface_factory.placeholder_handle();
        let config = content.popup_config(placeholder);
        self.content = Some(content);

        log::info!("Window session {:?} initialized as popup at {:?}", self.id, self.bounds);
        config
    }

    /// Create the display surface and attach the content to it
    ///
    /// Top-level sessions start browser creation inside the new surface;
    /// popups move their already-created browser under it. Either way the
    /// surface is then shown.
    ///
    /// If the surface cannot be created the session treats it as destroyed
    /// and force-closes the content, so teardown still completes.
    ///
    /// # Panics
    /// Panics off the control thread or before initialization.
    pub fn realize_display_surface(&mut self, settings: &BrowserSettings) -> Result<(), SessionError> {
        self.require_control_thread();
        self.require_initialized();

        if self.realized {
            log::warn!("Window session {:?} already realized", self.id);
            return Ok(());
        }
        if self.content.is_none() || self.teardown.is_set(TeardownFlags::SURFACE) {
            log::debug!("Window session {:?} torn down before realization", self.id);
            return Ok(());
        }

        let surface = match self.services.surface_factory.create_surface(self.id, self.surface_rect(), self.is_popup) {
            Ok(surface) => surface,
            Err(err) => {
                self.abandon_surface();
                return Err(err.into());
            }
        };
        let parent = Some(surface.handle());
        self.surface = Some(surface);
        self.realized = true;

        let viewport = self.viewport();
        if self.is_popup {
            if let Some(content) = self.content.as_mut() {
                content.show_popup(parent, viewport);
            }
        } else {
            let request_context = self.delegate.as_ref().and_then(|delegate| delegate.request_context(self.id));
            if let Some(content) = self.content.as_mut() {
                content.create_browser(parent, viewport, settings, request_context);
            }
        }

        self.show(ShowMode::Normal);
        Ok(())
    }

    /// The native surface asked to close
    ///
    /// Returns `true` to veto: a live browser was asked to close gracefully
    /// and the surface must wait for the content teardown. Returns `false`
    /// when the caller may destroy the surface now.
    pub fn on_close_requested(&mut self) -> bool {
        self.require_control_thread();
        if let Some(content) = self.content.as_mut() {
            if !content.is_closing() && content.browser().is_some() {
                log::debug!("Window session {:?}: closing browser before surface", self.id);
                content.close_browser(false);
                return true;
            }
        }
        false
    }

    /// The display surface is gone
    ///
    /// A report for a surface the session already counted as gone (it was
    /// never realized, or could not be created) is ignored.
    pub fn on_display_surface_destroyed(&mut self) {
        self.require_control_thread();
        self.require_initialized();

        self.surface = None;
        if self.surface_implied {
            log::debug!("Window session {:?}: surface already counted as destroyed", self.id);
            return;
        }
        self.teardown.mark(TeardownFlags::SURFACE);
        self.notify_destroyed_if_done();
    }

    /// The engine finished creating the browser
    ///
    /// Popups realize their display surface now; top-level sessions size the
    /// browser to their surface.
    pub fn on_content_session_ready(&mut self) -> Result<(), SessionError> {
        self.require_control_thread();

        if self.is_popup {
            if !self.realized && !self.teardown.is_set(TeardownFlags::SURFACE) {
                return self.realize_display_surface(&BrowserSettings::default());
            }
        } else {
            self.on_size(false);
        }
        Ok(())
    }

    /// The engine tore down the content session
    ///
    /// If the display surface is still alive the content went first (script
    /// `window.close()`, or off-screen teardown) and the surface is
    /// force-closed.
    pub fn on_content_session_destroyed(&mut self) {
        self.require_control_thread();
        self.require_initialized();

        self.content = None;

        if !self.teardown.is_set(TeardownFlags::SURFACE) {
            if self.surface.is_some() {
                self.force_close_surface();
            } else {
                // Never realized: there is no surface to wait for
                self.imply_surface_destroyed();
            }
        }

        self.teardown.mark(TeardownFlags::CONTENT);
        self.notify_destroyed_if_done();
    }

    /// Show the display surface
    pub fn show(&mut self, mode: ShowMode) {
        self.require_control_thread();
        if let Some(surface) = self.surface.as_mut() {
            surface.show(mode);
        }
    }

    /// Hide the display surface
    pub fn hide(&mut self) {
        self.require_control_thread();
        if let Some(surface) = self.surface.as_mut() {
            surface.hide();
        }
    }

    /// Move and resize the window
    ///
    /// Before realization this only updates the stored bounds.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.require_control_thread();
        let rect = Rect::from_bounds(bounds);
        if !self.realized {
            self.bounds = rect;
        } else if let Some(surface) = self.surface.as_mut() {
            surface.set_bounds(rect);
        }
    }

    /// Close the window
    ///
    /// A non-forced close goes through the surface's close request (and so
    /// through [`on_close_requested`](Self::on_close_requested)). A forced
    /// close tears down content and surface without asking.
    pub fn close(&mut self, force: bool) {
        self.require_control_thread();

        if force {
            if let Some(content) = self.content.as_mut() {
                if !content.is_closing() {
                    content.close_browser(true);
                }
            }
            if self.surface.is_some() {
                self.force_close_surface();
            }
        } else if let Some(surface) = self.surface.as_mut() {
            surface.close(false);
        }
    }

    /// Set the content's device scale factor
    pub fn set_device_scale_factor(&mut self, scale: f32) {
        self.require_control_thread();
        if let Some(content) = self.content.as_mut() {
            content.set_device_scale_factor(scale);
        }
    }

    /// Content's device scale factor (1.0 without content)
    pub fn device_scale_factor(&self) -> f32 {
        self.require_control_thread();
        self.content.as_ref().map_or(1.0, |content| content.device_scale_factor())
    }

    /// The browser, once created
    pub fn browser(&self) -> Option<BrowserId> {
        self.require_control_thread();
        self.content.as_ref().and_then(|content| content.browser())
    }

    /// Native handle of the display surface, once realized
    pub fn surface_handle(&self) -> Option<SurfaceHandle> {
        self.require_control_thread();
        self.surface.as_ref().map(|surface| surface.handle())
    }

    /// The display surface gained focus
    pub fn on_focus(&mut self) {
        self.require_control_thread();
        if let Some(content) = self.content.as_mut() {
            content.set_focus(true);
        }
    }

    /// The display surface moved
    ///
    /// Lets the browser reposition or dismiss its own popups.
    pub fn on_move(&mut self) {
        self.require_control_thread();
        if let Some(content) = self.content.as_mut() {
            if content.browser().is_some() {
                content.notify_move_or_resize_started();
            }
        }
    }

    /// The display surface was resized or minimized
    pub fn on_size(&mut self, minimized: bool) {
        self.require_control_thread();
        if minimized {
            return;
        }
        if let (Some(surface), Some(content)) = (self.surface.as_ref(), self.content.as_mut()) {
            let rect = surface.bounds();
            content.resize(rect.width(), rect.height());
        }
    }

    /// Content navigated
    pub fn on_set_address(&mut self, url: &str) {
        self.require_control_thread();
        self.address = url.to_string();
    }

    /// Content changed its title
    pub fn on_set_title(&mut self, title: &str) {
        self.require_control_thread();
        self.title = title.to_string();
        if let Some(surface) = self.surface.as_mut() {
            surface.set_title(title);
        }
    }

    /// Content entered or left fullscreen
    pub fn on_set_fullscreen(&mut self, fullscreen: bool) {
        self.require_control_thread();
        self.fullscreen = fullscreen;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_fullscreen(fullscreen);
        }
    }

    /// Content loading state changed
    pub fn on_set_loading_state(&mut self, state: LoadingState) {
        self.require_control_thread();
        self.loading = state;
    }

    /// Session identity
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Whether this session was initialized as a popup
    pub fn is_popup(&self) -> bool {
        self.is_popup
    }

    /// Whether content is rendered off-screen
    pub fn uses_osr(&self) -> bool {
        self.with_osr
    }

    /// Whether initialization has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Stored window bounds
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Last address reported by content
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Last title reported by content
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Last loading state reported by content
    pub fn loading_state(&self) -> LoadingState {
        self.loading
    }

    /// Whether content is fullscreen
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Current joint lifecycle state
    pub fn state(&self) -> LifecycleState {
        if !self.initialized {
            return LifecycleState::Created;
        }
        match (
            self.teardown.is_set(TeardownFlags::SURFACE),
            self.teardown.is_set(TeardownFlags::CONTENT),
        ) {
            (true, true) => LifecycleState::BothDown,
            (true, false) => LifecycleState::SurfaceDown,
            (false, true) => LifecycleState::SessionDown,
            (false, false) if self.realized => LifecycleState::Live,
            (false, false) => LifecycleState::Initializing,
        }
    }

    /// Whether both halves are gone and the owner was notified
    pub fn is_fully_destroyed(&self) -> bool {
        self.teardown.is_notified()
    }

    /// Rectangle the display surface is created with
    fn surface_rect(&self) -> Rect {
        if self.bounds.is_empty() {
            Rect::from_bounds(self.services.context.window_config().default_viewport)
        } else {
            self.bounds
        }
    }

    /// Browser view rectangle, relative to the display surface
    fn viewport(&self) -> Rect {
        let window = self.services.context.window_config();
        let size = match window.viewport_policy {
            ViewportPolicy::StoredBounds => self.surface_rect().to_bounds(),
            ViewportPolicy::FixedDefault => window.default_viewport,
        };
        Rect::new(0, 0, size.width, size.height)
    }

    fn force_close_surface(&mut self) {
        if self.surface_close_forced {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            self.surface_close_forced = true;
            surface.close(true);
        }
    }

    fn imply_surface_destroyed(&mut self) {
        self.surface_implied = true;
        self.teardown.mark(TeardownFlags::SURFACE);
    }

    fn abandon_surface(&mut self) {
        self.imply_surface_destroyed();
        if let Some(content) = self.content.as_mut() {
            if !content.is_closing() {
                content.close_browser(true);
            }
        }
    }

    fn notify_destroyed_if_done(&mut self) {
        if self.teardown.take_notification() {
            log::info!("Window session {:?} fully destroyed", self.id);
            if let Some(delegate) = self.delegate.as_ref() {
                delegate.on_session_destroyed(self.id);
            }
        }
    }

    fn require_control_thread(&self) {
        assert!(
            self.services.control.is_current(),
            "window session {:?} used off the control thread",
            self.id
        );
    }

    fn require_initialized(&self) {
        assert!(self.initialized, "window session {:?} used before initialization", self.id);
    }
}

impl Drop for WindowSession {
    fn drop(&mut self) {
        if self.initialized && !self.teardown.is_complete() {
            log::warn!(
                "Window session {:?} dropped before teardown completed ({:?})",
                self.id,
                self.state()
            );
        }
    }
}

impl std::fmt::Debug for WindowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSession")
            .field("id", &self.id)
            .field("is_popup", &self.is_popup)
            .field("bounds", &self.bounds)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
