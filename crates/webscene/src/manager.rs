//! Window manager
//!
//! The owner of every [`WindowSession`]. It creates sessions and popups,
//! answers their request-context queries, drains the control queue and drops
//! sessions once both their halves are torn down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::SlotMap;

use crate::browser::{ContentSessionFactory, PopupConfig, RequestContext};
use crate::control::{ControlPoster, ControlTask, ControlThread};
use crate::core::context::MainContext;
use crate::foundation::geometry::{Bounds, PopupFeatures};
use crate::session::{SessionDelegate, SessionError, SessionId, SessionServices, WindowSession};
use crate::surface::SurfaceFactory;

/// Delegate handed to every session
///
/// Holds no sessions itself; destroyed sessions are queued here and reaped
/// by the manager after the callback that destroyed them returns.
struct ManagerDelegate {
    shared_context: RequestContext,
    per_session: bool,
    next_context: Cell<u32>,
    destroyed: RefCell<Vec<SessionId>>,
}

impl ManagerDelegate {
    fn new(per_session: bool) -> Self {
        Self {
            shared_context: RequestContext { id: 0, shared: true },
            per_session,
            next_context: Cell::new(1),
            destroyed: RefCell::new(Vec::new()),
        }
    }

    fn take_destroyed(&self) -> Vec<SessionId> {
        std::mem::take(&mut *self.destroyed.borrow_mut())
    }
}

impl SessionDelegate for ManagerDelegate {
    fn request_context(&self, session: SessionId) -> Option<RequestContext> {
        if !self.per_session {
            return Some(self.shared_context.clone());
        }
        let id = self.next_context.get();
        self.next_context.set(id + 1);
        log::debug!("Request context {} created for {:?}", id, session);
        Some(RequestContext { id, shared: false })
    }

    fn on_session_destroyed(&self, session: SessionId) {
        self.destroyed.borrow_mut().push(session);
    }
}

/// Owner of all window sessions
pub struct WindowManager {
    services: Rc<SessionServices>,
    delegate: Rc<ManagerDelegate>,
    sessions: SlotMap<SessionId, WindowSession>,
}

impl WindowManager {
    /// Create a manager running on `control`
    pub fn new(
        context: Rc<MainContext>,
        control: ControlThread,
        content_factory: Box<dyn ContentSessionFactory>,
        surface_factory: Box<dyn SurfaceFactory>,
    ) -> Self {
        let delegate = Rc::new(ManagerDelegate::new(context.request_context_per_session()));
        let services = Rc::new(SessionServices::new(context, control, content_factory, surface_factory));

        Self {
            services,
            delegate,
            sessions: SlotMap::with_key(),
        }
    }

    /// Handle other threads use to post onto the control thread
    pub fn poster(&self) -> ControlPoster {
        self.services.control.poster()
    }

    /// Process-wide settings
    pub fn context(&self) -> &MainContext {
        &self.services.context
    }

    /// Create and initialize a top-level window
    ///
    /// `None` arguments fall back to the configured initial bounds and
    /// startup URL.
    pub fn create_session(&mut self, bounds: Option<Bounds>, url: Option<&str>) -> SessionId {
        let context = Rc::clone(&self.services.context);
        let window = context.window_config();
        let bounds = bounds.unwrap_or(window.initial_bounds);
        let url = url.unwrap_or_else(|| context.startup_url());

        let id = self.insert_session();
        let delegate: Rc<dyn SessionDelegate> = self.delegate.clone();
        self.sessions[id].initialize(
            delegate,
            window.with_osr,
            bounds,
            context.browser_settings().clone(),
            url,
        );

        log::info!("Created window {:?} ({} open)", id, self.sessions.len());
        self.reap_destroyed();
        id
    }

    /// Create and initialize a popup requested by existing content
    pub fn create_popup(&mut self, features: &PopupFeatures) -> (SessionId, PopupConfig) {
        let with_osr = self.services.context.window_config().with_osr;

        let id = self.insert_session();
        let delegate: Rc<dyn SessionDelegate> = self.delegate.clone();
        let config = self.sessions[id].initialize_as_popup(delegate, with_osr, features);

        log::info!("Created popup {:?} ({} open)", id, self.sessions.len());
        (id, config)
    }

    /// Look up a session
    pub fn session(&self, id: SessionId) -> Option<&WindowSession> {
        self.sessions.get(id)
    }

    /// Look up a session mutably
    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut WindowSession> {
        self.sessions.get_mut(id)
    }

    /// Ids of all live sessions
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.keys().collect()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether every session has been torn down
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Run every queued control task
    ///
    /// Returns the number of tasks processed. Tasks posted while pumping are
    /// processed in the same call.
    ///
    /// # Panics
    /// Panics off the control thread.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Some(task) = self.services.control.try_next() {
            self.dispatch(task);
            processed += 1;
        }
        processed
    }

    /// Run one control task
    pub fn dispatch(&mut self, task: ControlTask) {
        let id = task.session();
        let Some(session) = self.sessions.get_mut(id) else {
            log::debug!("Dropping {:?}: session is gone", task);
            return;
        };

        match task {
            ControlTask::RealizeDisplaySurface { settings, .. } => {
                if let Err(err) = session.realize_display_surface(&settings) {
                    log::error!("Window {:?}: {}", id, err);
                }
            }
            ControlTask::ContentSessionReady { .. } => {
                if let Err(err) = session.on_content_session_ready() {
                    log::error!("Window {:?}: {}", id, err);
                }
            }
            ControlTask::ContentSessionDestroyed { .. } => session.on_content_session_destroyed(),
            ControlTask::DisplaySurfaceDestroyed { .. } => session.on_display_surface_destroyed(),
            ControlTask::CloseRequested { .. } => {
                if session.on_close_requested() {
                    log::debug!("Window {:?}: close deferred until content closes", id);
                } else {
                    session.close(true);
                }
            }
            ControlTask::Focused { .. } => session.on_focus(),
            ControlTask::Moved { .. } => session.on_move(),
            ControlTask::Resized { minimized, .. } => session.on_size(minimized),
            ControlTask::AddressChanged { url, .. } => session.on_set_address(&url),
            ControlTask::TitleChanged { title, .. } => session.on_set_title(&title),
            ControlTask::FullscreenChanged { fullscreen, .. } => session.on_set_fullscreen(fullscreen),
            ControlTask::LoadingStateChanged { state, .. } => session.on_set_loading_state(state),
        }

        self.reap_destroyed();
    }

    /// Close one window
    pub fn close_session(&mut self, id: SessionId, force: bool) -> Result<(), SessionError> {
        let session = self.sessions.get_mut(id).ok_or(SessionError::UnknownSession(id))?;
        session.close(force);
        self.reap_destroyed();
        Ok(())
    }

    /// Close every window
    pub fn close_all_sessions(&mut self, force: bool) {
        log::info!("Closing {} window(s) (force: {})", self.sessions.len(), force);
        for session in self.sessions.values_mut() {
            session.close(force);
        }
        self.reap_destroyed();
    }

    fn insert_session(&mut self) -> SessionId {
        let services = Rc::clone(&self.services);
        self.sessions.insert_with_key(|id| WindowSession::new(id, services))
    }

    fn reap_destroyed(&mut self) {
        for id in self.delegate.take_destroyed() {
            if self.sessions.remove(id).is_some() {
                log::info!("Window {:?} removed ({} open)", id, self.sessions.len());
            }
        }
    }
}

impl Drop for WindowManager {
    fn drop(&mut self) {
        if !self.sessions.is_empty() {
            log::warn!("Window manager dropped with {} live session(s)", self.sessions.len());
        }
    }
}
