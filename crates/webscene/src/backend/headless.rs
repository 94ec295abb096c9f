//! Headless backend
//!
//! In-process stand-ins for the browser engine and the windowing layer. No
//! pixels are produced; every call is recorded in a shared [`CallLog`] so
//! callers can see exactly what the coordinator asked for.
//!
//! With auto events enabled the fakes behave like the real collaborators and
//! report back through the control queue: browser creation posts
//! `ContentSessionReady`, a browser close posts `ContentSessionDestroyed`, a
//! polite surface close posts `CloseRequested` and a forced one posts
//! `DisplaySurfaceDestroyed`. Without auto events nothing is posted and the
//! caller drives the callbacks by hand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::browser::{
    BrowserId, ClientRef, ContentSession, ContentSessionFactory, PopupConfig, RequestContext, WindowInfo,
};
use crate::control::{ControlPoster, ControlTask};
use crate::core::config::{BrowserSettings, OsrSettings};
use crate::foundation::geometry::Rect;
use crate::session::SessionId;
use crate::surface::{DisplaySurface, ShowMode, SurfaceError, SurfaceFactory, SurfaceHandle};

/// Handle of the hidden placeholder surface
pub const PLACEHOLDER_HANDLE: SurfaceHandle = SurfaceHandle(0);

/// One call made into the headless engine or windowing layer
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    /// `ContentSession::create_browser`
    CreateBrowser {
        /// Owning session
        session: SessionId,
        /// Parent surface
        parent: Option<SurfaceHandle>,
        /// Browser view rectangle
        rect: Rect,
        /// Request context
        request_context: Option<RequestContext>,
    },
    /// `ContentSession::show_popup`
    ShowPopup {
        /// Owning session
        session: SessionId,
        /// Parent surface
        parent: Option<SurfaceHandle>,
        /// Popup view rectangle
        rect: Rect,
    },
    /// `ContentSession::close_browser`
    CloseBrowser {
        /// Owning session
        session: SessionId,
        /// Forced close
        force: bool,
    },
    /// `ContentSession::set_focus`
    SetFocus {
        /// Owning session
        session: SessionId,
        /// Focus state
        focus: bool,
    },
    /// `ContentSession::set_device_scale_factor`
    SetScaleFactor {
        /// Owning session
        session: SessionId,
        /// New scale factor
        scale: f32,
    },
    /// `ContentSession::notify_move_or_resize_started`
    MoveOrResizeStarted {
        /// Owning session
        session: SessionId,
    },
    /// `ContentSession::resize`
    ResizeBrowser {
        /// Owning session
        session: SessionId,
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// `SurfaceFactory::create_surface`
    CreateSurface {
        /// Owning session
        session: SessionId,
        /// Surface rectangle
        rect: Rect,
        /// Whether the surface hosts a popup
        popup: bool,
    },
    /// `DisplaySurface::show`
    ShowSurface {
        /// Owning session
        session: SessionId,
        /// Show mode
        mode: ShowMode,
    },
    /// `DisplaySurface::hide`
    HideSurface {
        /// Owning session
        session: SessionId,
    },
    /// `DisplaySurface::set_bounds`
    SetSurfaceBounds {
        /// Owning session
        session: SessionId,
        /// New rectangle
        rect: Rect,
    },
    /// `DisplaySurface::close`
    CloseSurface {
        /// Owning session
        session: SessionId,
        /// Forced close
        force: bool,
    },
    /// `DisplaySurface::set_title`
    SetTitle {
        /// Owning session
        session: SessionId,
        /// New title
        title: String,
    },
    /// `DisplaySurface::set_fullscreen`
    SetFullscreen {
        /// Owning session
        session: SessionId,
        /// Fullscreen state
        fullscreen: bool,
    },
}

/// Shared, ordered record of engine and windowing calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<EngineCall>>>);

impl CallLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: EngineCall) {
        log::debug!("headless: {:?}", call);
        self.0.borrow_mut().push(call);
    }

    /// Snapshot of every recorded call
    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.borrow().clone()
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&EngineCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|call| predicate(call)).count()
    }

    /// Whether `call` was recorded
    pub fn contains(&self, call: &EngineCall) -> bool {
        self.0.borrow().contains(call)
    }

    /// Forget every recorded call
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Builds [`HeadlessContent`] sessions
pub struct HeadlessContentFactory {
    poster: ControlPoster,
    log: CallLog,
    auto_events: bool,
    next_browser: Rc<Cell<u32>>,
}

impl HeadlessContentFactory {
    /// Create a factory that posts engine events to `poster`
    pub fn new(poster: ControlPoster, log: CallLog) -> Self {
        Self {
            poster,
            log,
            auto_events: true,
            next_browser: Rc::new(Cell::new(1)),
        }
    }

    /// Enable or disable automatic engine events
    pub fn with_auto_events(mut self, enabled: bool) -> Self {
        self.auto_events = enabled;
        self
    }
}

impl ContentSessionFactory for HeadlessContentFactory {
    fn create(&self, session: SessionId, startup_url: &str, settings: OsrSettings) -> Box<dyn ContentSession> {
        Box::new(HeadlessContent {
            session,
            startup_url: startup_url.to_string(),
            settings,
            browser: Cell::new(None),
            closing: false,
            scale: 1.0,
            poster: self.poster.clone(),
            log: self.log.clone(),
            auto_events: self.auto_events,
            next_browser: Rc::clone(&self.next_browser),
        })
    }
}

/// Headless off-screen browser
pub struct HeadlessContent {
    session: SessionId,
    startup_url: String,
    settings: OsrSettings,
    browser: Cell<Option<BrowserId>>,
    closing: bool,
    scale: f32,
    poster: ControlPoster,
    log: CallLog,
    auto_events: bool,
    next_browser: Rc<Cell<u32>>,
}

impl HeadlessContent {
    /// URL the browser was created with
    pub fn startup_url(&self) -> &str {
        &self.startup_url
    }

    /// Off-screen settings the browser was created with
    pub fn settings(&self) -> &OsrSettings {
        &self.settings
    }

    /// The engine created the browser
    fn attach_browser(&self) {
        let id = self.next_browser.get();
        self.next_browser.set(id + 1);
        self.browser.set(Some(BrowserId(id)));

        if self.auto_events {
            self.poster.post(ControlTask::ContentSessionReady { session: self.session });
        }
    }
}

impl ContentSession for HeadlessContent {
    fn create_browser(
        &mut self,
        parent: Option<SurfaceHandle>,
        rect: Rect,
        _settings: &BrowserSettings,
        request_context: Option<RequestContext>,
    ) {
        self.log.record(EngineCall::CreateBrowser {
            session: self.session,
            parent,
            rect,
            request_context,
        });
        self.attach_browser();
    }

    fn popup_config(&self, temporary_parent: SurfaceHandle) -> PopupConfig {
        let config = PopupConfig {
            window_info: WindowInfo {
                parent: Some(temporary_parent),
                windowless: true,
                windowless_frame_rate: self.settings.windowless_frame_rate,
            },
            client: ClientRef(self.session),
            settings: BrowserSettings::default(),
        };
        // The engine creates the popup browser right after reading its config
        self.attach_browser();
        config
    }

    fn show_popup(&mut self, parent: Option<SurfaceHandle>, rect: Rect) {
        self.log.record(EngineCall::ShowPopup {
            session: self.session,
            parent,
            rect,
        });
    }

    fn browser(&self) -> Option<BrowserId> {
        self.browser.get()
    }

    fn close_browser(&mut self, force: bool) {
        self.log.record(EngineCall::CloseBrowser {
            session: self.session,
            force,
        });
        if self.closing {
            return;
        }
        self.closing = true;

        if self.auto_events {
            self.poster.post(ControlTask::ContentSessionDestroyed { session: self.session });
        }
    }

    fn is_closing(&self) -> bool {
        self.closing
    }

    fn set_device_scale_factor(&mut self, scale: f32) {
        self.log.record(EngineCall::SetScaleFactor {
            session: self.session,
            scale,
        });
        self.scale = scale;
    }

    fn device_scale_factor(&self) -> f32 {
        self.scale
    }

    fn set_focus(&mut self, focus: bool) {
        self.log.record(EngineCall::SetFocus {
            session: self.session,
            focus,
        });
    }

    fn notify_move_or_resize_started(&mut self) {
        self.log.record(EngineCall::MoveOrResizeStarted { session: self.session });
    }

    fn resize(&mut self, width: i32, height: i32) {
        self.log.record(EngineCall::ResizeBrowser {
            session: self.session,
            width,
            height,
        });
    }
}

/// Builds [`HeadlessSurface`]s
pub struct HeadlessSurfaceFactory {
    poster: ControlPoster,
    log: CallLog,
    auto_events: bool,
    next_handle: Cell<u64>,
    fail_next: Cell<bool>,
}

impl HeadlessSurfaceFactory {
    /// Create a factory that posts windowing events to `poster`
    pub fn new(poster: ControlPoster, log: CallLog) -> Self {
        Self {
            poster,
            log,
            auto_events: true,
            next_handle: Cell::new(PLACEHOLDER_HANDLE.0 + 1),
            fail_next: Cell::new(false),
        }
    }

    /// Enable or disable automatic windowing events
    pub fn with_auto_events(mut self, enabled: bool) -> Self {
        self.auto_events = enabled;
        self
    }

    /// Make the next `create_surface` call fail
    pub fn fail_next_creation(&self) {
        self.fail_next.set(true);
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create_surface(
        &self,
        session: SessionId,
        rect: Rect,
        is_popup: bool,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError> {
        if self.fail_next.replace(false) {
            return Err(SurfaceError::CreationFailed(format!("headless surface for {session:?}")));
        }

        self.log.record(EngineCall::CreateSurface {
            session,
            rect,
            popup: is_popup,
        });

        let handle = SurfaceHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);

        Ok(Box::new(HeadlessSurface {
            session,
            handle,
            rect,
            visible: false,
            destroyed: false,
            poster: self.poster.clone(),
            log: self.log.clone(),
            auto_events: self.auto_events,
        }))
    }

    fn placeholder_handle(&self) -> SurfaceHandle {
        PLACEHOLDER_HANDLE
    }
}

/// Headless display surface
pub struct HeadlessSurface {
    session: SessionId,
    handle: SurfaceHandle,
    rect: Rect,
    visible: bool,
    destroyed: bool,
    poster: ControlPoster,
    log: CallLog,
    auto_events: bool,
}

impl HeadlessSurface {
    /// Whether the surface is currently shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl DisplaySurface for HeadlessSurface {
    fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    fn show(&mut self, mode: ShowMode) {
        self.log.record(EngineCall::ShowSurface {
            session: self.session,
            mode,
        });
        self.visible = true;
    }

    fn hide(&mut self) {
        self.log.record(EngineCall::HideSurface { session: self.session });
        self.visible = false;
    }

    fn set_bounds(&mut self, rect: Rect) {
        self.log.record(EngineCall::SetSurfaceBounds {
            session: self.session,
            rect,
        });
        self.rect = rect;
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn close(&mut self, force: bool) {
        self.log.record(EngineCall::CloseSurface {
            session: self.session,
            force,
        });
        if self.destroyed || !self.auto_events {
            self.destroyed |= force;
            return;
        }

        if force {
            self.destroyed = true;
            self.visible = false;
            self.poster.post(ControlTask::DisplaySurfaceDestroyed { session: self.session });
        } else {
            self.poster.post(ControlTask::CloseRequested { session: self.session });
        }
    }

    fn set_title(&mut self, title: &str) {
        self.log.record(EngineCall::SetTitle {
            session: self.session,
            title: title.to_string(),
        });
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.log.record(EngineCall::SetFullscreen {
            session: self.session,
            fullscreen,
        });
    }
}
