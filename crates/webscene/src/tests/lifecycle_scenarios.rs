//! End-to-end window lifecycles driven through the control queue

use std::rc::Rc;
use std::thread;

use crate::backend::headless::{CallLog, EngineCall, HeadlessContentFactory, HeadlessSurfaceFactory};
use crate::browser::LoadingState;
use crate::control::{ControlTask, ControlThread};
use crate::core::config::ApplicationConfig;
use crate::core::context::MainContext;
use crate::foundation::geometry::{Bounds, PopupFeatures, Rect};
use crate::manager::WindowManager;
use crate::session::{LifecycleState, SessionError, SessionId};

fn headless_manager(config: ApplicationConfig) -> (WindowManager, CallLog) {
    let control = ControlThread::current();
    let log = CallLog::new();
    let content = HeadlessContentFactory::new(control.poster(), log.clone());
    let surfaces = HeadlessSurfaceFactory::new(control.poster(), log.clone());
    let manager = WindowManager::new(
        Rc::new(MainContext::new(config)),
        control,
        Box::new(content),
        Box::new(surfaces),
    );
    (manager, log)
}

fn position(log: &CallLog, call: &EngineCall) -> usize {
    log.calls()
        .iter()
        .position(|recorded| recorded == call)
        .unwrap_or_else(|| panic!("{call:?} was never made"))
}

fn request_context_id(log: &CallLog, session: SessionId) -> u32 {
    log.calls()
        .into_iter()
        .find_map(|call| match call {
            EngineCall::CreateBrowser {
                session: owner,
                request_context: Some(context),
                ..
            } if owner == session => Some(context.id),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_graceful_close_through_control_queue() {
    let (mut manager, log) = headless_manager(ApplicationConfig::default());
    let id = manager.create_session(Some(Bounds::new(0, 0, 1024, 768)), None);

    // Browser creation reports back; the browser is sized to its surface
    assert_eq!(manager.pump(), 1);
    assert!(log.contains(&EngineCall::ResizeBrowser {
        session: id,
        width: 1024,
        height: 768,
    }));
    assert_eq!(manager.session(id).unwrap().state(), LifecycleState::Live);

    manager.close_session(id, false).unwrap();
    manager.pump();

    assert!(manager.is_empty());
    let polite = position(&log, &EngineCall::CloseSurface { session: id, force: false });
    let browser = position(&log, &EngineCall::CloseBrowser { session: id, force: false });
    let forced = position(&log, &EngineCall::CloseSurface { session: id, force: true });
    assert!(polite < browser && browser < forced);
}

#[test]
fn test_content_closing_itself_takes_the_window_down() {
    let (mut manager, log) = headless_manager(ApplicationConfig::default());
    let id = manager.create_session(None, Some("https://example.com"));
    manager.pump();

    // Script called window.close()
    manager.poster().post(ControlTask::ContentSessionDestroyed { session: id });
    manager.pump();

    assert!(manager.session(id).is_none());
    assert_eq!(
        log.count(|call| matches!(call, EngineCall::CloseSurface { force: true, .. })),
        1
    );
}

#[test]
fn test_popup_realized_after_browser_exists() {
    let (mut manager, log) = headless_manager(ApplicationConfig::default());
    let features = PopupFeatures {
        x: Some(50),
        width: Some(400),
        height: Some(300),
        ..PopupFeatures::default()
    };

    let (id, config) = manager.create_popup(&features);
    assert!(config.window_info.windowless);
    assert_eq!(manager.session(id).unwrap().state(), LifecycleState::Initializing);

    manager.pump();

    let popup = manager.session(id).unwrap();
    assert!(popup.is_popup());
    assert_eq!(popup.state(), LifecycleState::Live);
    assert!(log.contains(&EngineCall::CreateSurface {
        session: id,
        rect: Rect::new(50, 0, 450, 300),
        popup: true,
    }));
    assert!(log.contains(&EngineCall::ShowPopup {
        session: id,
        parent: popup.surface_handle(),
        rect: Rect::new(0, 0, 400, 300),
    }));
}

#[test]
fn test_forced_close_of_every_window() {
    let (mut manager, log) = headless_manager(ApplicationConfig::default());
    manager.create_session(None, None);
    manager.create_session(None, None);
    manager.create_popup(&PopupFeatures::default());
    manager.pump();
    assert_eq!(manager.len(), 3);

    manager.close_all_sessions(true);
    manager.pump();

    assert!(manager.is_empty());
    assert_eq!(
        log.count(|call| matches!(call, EngineCall::CloseSurface { force: true, .. })),
        3
    );
}

#[test]
fn test_engine_thread_updates_reach_the_session() {
    let (mut manager, log) = headless_manager(ApplicationConfig::default());
    let id = manager.create_session(None, None);
    let poster = manager.poster();

    thread::spawn(move || {
        poster.post(ControlTask::TitleChanged {
            session: id,
            title: "Loaded".to_string(),
        });
        poster.post(ControlTask::LoadingStateChanged {
            session: id,
            state: LoadingState {
                is_loading: false,
                can_go_back: true,
                can_go_forward: false,
            },
        });
    })
    .join()
    .unwrap();
    manager.pump();

    let session = manager.session(id).unwrap();
    assert_eq!(session.title(), "Loaded");
    assert!(session.loading_state().can_go_back);
    assert!(log.contains(&EngineCall::SetTitle {
        session: id,
        title: "Loaded".to_string(),
    }));
}

#[test]
fn test_shared_request_context_by_default() {
    let (mut manager, log) = headless_manager(ApplicationConfig::default());
    let first = manager.create_session(None, None);
    let second = manager.create_session(None, None);

    assert_eq!(request_context_id(&log, first), request_context_id(&log, second));
}

#[test]
fn test_request_context_per_session() {
    let config = ApplicationConfig {
        request_context_per_session: true,
        ..ApplicationConfig::default()
    };
    let (mut manager, log) = headless_manager(config);
    let first = manager.create_session(None, None);
    let second = manager.create_session(None, None);

    assert_ne!(request_context_id(&log, first), request_context_id(&log, second));
}

#[test]
fn test_tasks_for_removed_sessions_are_dropped() {
    let (mut manager, _log) = headless_manager(ApplicationConfig::default());
    let id = manager.create_session(None, None);
    manager.close_all_sessions(true);
    manager.pump();
    assert!(manager.is_empty());

    manager.poster().post(ControlTask::Focused { session: id });
    manager.poster().post(ControlTask::DisplaySurfaceDestroyed { session: id });
    assert_eq!(manager.pump(), 2);

    assert!(matches!(
        manager.close_session(id, false),
        Err(SessionError::UnknownSession(unknown)) if unknown == id
    ));
}

#[test]
fn test_surface_failure_still_removes_window() {
    let control = ControlThread::current();
    let log = CallLog::new();
    let content = HeadlessContentFactory::new(control.poster(), log.clone());
    let surfaces = HeadlessSurfaceFactory::new(control.poster(), log.clone());
    surfaces.fail_next_creation();
    let mut manager = WindowManager::new(
        Rc::new(MainContext::default()),
        control,
        Box::new(content),
        Box::new(surfaces),
    );

    let id = manager.create_session(None, None);
    assert_eq!(manager.session(id).unwrap().state(), LifecycleState::SurfaceDown);

    manager.pump();
    assert!(manager.is_empty());
}
