//! Shared test fixtures and cross-module lifecycle scenarios

mod lifecycle_scenarios;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread;

use slotmap::SlotMap;

use crate::backend::headless::{CallLog, HeadlessContentFactory, HeadlessSurfaceFactory};
use crate::browser::RequestContext;
use crate::control::ControlThread;
use crate::core::config::ApplicationConfig;
use crate::core::context::MainContext;
use crate::session::{SessionDelegate, SessionId, SessionServices, WindowSession};

/// Request context handed out by [`RecordingDelegate`]
pub(crate) const TEST_CONTEXT: RequestContext = RequestContext { id: 42, shared: true };

/// Owner that records what sessions tell it
#[derive(Default)]
pub(crate) struct RecordingDelegate {
    pub destroyed: RefCell<Vec<SessionId>>,
    pub context_requests: Cell<usize>,
}

impl SessionDelegate for RecordingDelegate {
    fn request_context(&self, _session: SessionId) -> Option<RequestContext> {
        self.context_requests.set(self.context_requests.get() + 1);
        Some(TEST_CONTEXT)
    }

    fn on_session_destroyed(&self, session: SessionId) {
        self.destroyed.borrow_mut().push(session);
    }
}

/// Sessions wired to manual (non-posting) headless backends
pub(crate) struct Fixture {
    pub services: Rc<SessionServices>,
    pub log: CallLog,
    pub delegate: Rc<RecordingDelegate>,
    ids: SlotMap<SessionId, ()>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(ApplicationConfig::default(), ControlThread::current(), false)
    }

    pub fn with_config(config: ApplicationConfig) -> Self {
        Self::build(config, ControlThread::current(), false)
    }

    /// Control thread designated to some other thread
    pub fn off_control_thread() -> Self {
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        Self::build(ApplicationConfig::default(), ControlThread::for_thread(other), false)
    }

    /// The first display surface cannot be created
    pub fn failing_surface() -> Self {
        Self::build(ApplicationConfig::default(), ControlThread::current(), true)
    }

    fn build(config: ApplicationConfig, control: ControlThread, fail_surface: bool) -> Self {
        let log = CallLog::new();
        let content = HeadlessContentFactory::new(control.poster(), log.clone()).with_auto_events(false);
        let surfaces = HeadlessSurfaceFactory::new(control.poster(), log.clone()).with_auto_events(false);
        if fail_surface {
            surfaces.fail_next_creation();
        }
        let services = SessionServices::new(
            Rc::new(MainContext::new(config)),
            control,
            Box::new(content),
            Box::new(surfaces),
        );

        Self {
            services: Rc::new(services),
            log,
            delegate: Rc::new(RecordingDelegate::default()),
            ids: SlotMap::with_key(),
        }
    }

    pub fn session(&mut self) -> WindowSession {
        let id = self.ids.insert(());
        WindowSession::new(id, Rc::clone(&self.services))
    }

    pub fn delegate(&self) -> Rc<dyn SessionDelegate> {
        self.delegate.clone()
    }

    pub fn notifications(&self) -> usize {
        self.delegate.destroyed.borrow().len()
    }
}
