//! webscene demo application
//!
//! Opens a window and a popup, feeds them content updates from an engine
//! thread, then closes everything gracefully and waits until every session
//! has been torn down.
//!
//! Surfaces are headless unless the `glfw-backend` feature is enabled, in
//! which case real native windows are opened.

use std::error::Error;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use webscene::backend::headless::{CallLog, HeadlessContentFactory};
use webscene::prelude::*;

#[cfg(feature = "glfw-backend")]
use webscene::backend::glfw_surface::GlfwSurfaceFactory;
#[cfg(not(feature = "glfw-backend"))]
use webscene::backend::headless::HeadlessSurfaceFactory;

const DEFAULT_CONFIG_PATH: &str = "webscene.toml";
const MAX_FRAMES: usize = 600;
const FRAME_TIME: Duration = Duration::from_millis(16);

struct DemoApp {
    manager: WindowManager,
    calls: CallLog,
    #[cfg(feature = "glfw-backend")]
    windows: Rc<GlfwSurfaceFactory>,
}

impl DemoApp {
    fn new(config: ApplicationConfig) -> Result<Self, Box<dyn Error>> {
        let control = ControlThread::current();
        let calls = CallLog::new();
        let content = HeadlessContentFactory::new(control.poster(), calls.clone());

        #[cfg(feature = "glfw-backend")]
        let windows = Rc::new(GlfwSurfaceFactory::new(control.poster())?);
        #[cfg(feature = "glfw-backend")]
        let surfaces: Box<dyn SurfaceFactory> = Box::new(Rc::clone(&windows));
        #[cfg(not(feature = "glfw-backend"))]
        let surfaces: Box<dyn SurfaceFactory> = Box::new(HeadlessSurfaceFactory::new(control.poster(), calls.clone()));

        let manager = WindowManager::new(Rc::new(MainContext::new(config)), control, Box::new(content), surfaces);

        Ok(Self {
            manager,
            calls,
            #[cfg(feature = "glfw-backend")]
            windows,
        })
    }

    /// Forward native events and run queued control tasks
    fn frame(&mut self) -> usize {
        #[cfg(feature = "glfw-backend")]
        self.windows.poll_events();
        self.manager.pump()
    }

    fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let main = self.manager.create_session(None, None);
        let features = PopupFeatures {
            x: Some(50),
            width: Some(400),
            height: Some(300),
            ..PopupFeatures::default()
        };
        let (popup, _) = self.manager.create_popup(&features);
        self.frame();

        let poster = self.manager.poster();
        let engine = thread::spawn(move || {
            for (session, title) in [(main, "webscene demo"), (popup, "webscene popup")] {
                poster.post(ControlTask::AddressChanged {
                    session,
                    url: "about:blank".to_string(),
                });
                poster.post(ControlTask::TitleChanged {
                    session,
                    title: title.to_string(),
                });
                poster.post(ControlTask::LoadingStateChanged {
                    session,
                    state: LoadingState::default(),
                });
            }
        });
        engine.join().map_err(|_| "engine thread panicked")?;
        self.frame();

        for id in self.manager.session_ids() {
            if let Some(session) = self.manager.session(id) {
                log::info!("{:?}: '{}' at {} ({:?})", id, session.title(), session.address(), session.state());
            }
        }

        self.manager.close_all_sessions(false);
        for _ in 0..MAX_FRAMES {
            if self.manager.is_empty() {
                break;
            }
            self.frame();
            thread::sleep(FRAME_TIME);
        }

        if !self.manager.is_empty() {
            return Err(format!("{} window(s) never finished closing", self.manager.len()).into());
        }
        log::info!("All windows closed ({} engine calls)", self.calls.calls().len());
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ApplicationConfig::load_or_default(&path)?;
    config.validate()?;

    webscene::foundation::logging::init_with_level(&config.logging.level);
    log::info!("Starting webscene demo (config: {})", path);

    let mut app = DemoApp::new(config)?;
    app.run()
}
