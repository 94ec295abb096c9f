//! # webscene
//!
//! Root window lifecycle coordination for web content that is rendered
//! off-screen by an embedded browser engine and composited by a native
//! rendering pipeline.
//!
//! ## Features
//!
//! - **Window sessions**: Pair a native display surface with a content session
//! - **Teardown join**: Owner notified exactly once when both halves are gone
//! - **Popups**: Content-opened windows, realized once their browser exists
//! - **Control thread**: Single-writer discipline with a cross-thread task queue
//! - **Backends**: Headless fakes, plus glfw windows behind `glfw-backend`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use webscene::prelude::*;
//! use webscene::backend::headless::{CallLog, HeadlessContentFactory, HeadlessSurfaceFactory};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::load_or_default("webscene.toml")?;
//!     webscene::foundation::logging::init_with_level(&config.logging.level);
//!
//!     let control = ControlThread::current();
//!     let log = CallLog::new();
//!     let content = HeadlessContentFactory::new(control.poster(), log.clone());
//!     let surfaces = HeadlessSurfaceFactory::new(control.poster(), log);
//!
//!     let mut manager = WindowManager::new(
//!         Rc::new(MainContext::new(config)),
//!         control,
//!         Box::new(content),
//!         Box::new(surfaces),
//!     );
//!     manager.create_session(None, None);
//!     manager.close_all_sessions(false);
//!     while !manager.is_empty() {
//!         manager.pump();
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod browser;
pub mod config;
pub mod control;
pub mod core;
pub mod foundation;
pub mod manager;
pub mod session;
pub mod surface;

#[cfg(test)]
mod tests;

pub use manager::WindowManager;
pub use session::{SessionDelegate, SessionError, SessionId, WindowSession};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        WindowManager,
        browser::{BrowserId, ContentSession, ContentSessionFactory, LoadingState, PopupConfig, RequestContext},
        control::{ControlPoster, ControlTask, ControlThread},
        core::{ApplicationConfig, BrowserSettings, Config, ConfigError, MainContext, OsrSettings, ViewportPolicy},
        foundation::geometry::{Bounds, PopupFeatures, Rect},
        session::{LifecycleState, SessionDelegate, SessionError, SessionId, WindowSession},
        surface::{DisplaySurface, ShowMode, SurfaceFactory, SurfaceHandle},
    };
}
