//! Window lifecycle coordination
//!
//! A [`WindowSession`] pairs one native display surface with one embedded
//! content session. The two are torn down independently, in either order,
//! and the session's owner is told exactly once when both are gone.
//!
//! ## Lifecycle
//!
//! ```text
//! Created ─init─► Initializing ─realize─► Live ─┬─surface gone─► SurfaceDown ─┐
//!                                               └─content gone─► SessionDown ─┴─► BothDown
//! ```
//!
//! `BothDown` is terminal and the owner's
//! [`SessionDelegate::on_session_destroyed`] fires on entry.

pub mod content;
pub mod coordinator;
pub mod teardown;

use std::rc::Rc;

use thiserror::Error;

use crate::browser::{ContentSessionFactory, RequestContext};
use crate::control::ControlThread;
use crate::core::context::MainContext;
use crate::surface::{SurfaceError, SurfaceFactory};

pub use coordinator::WindowSession;
pub use teardown::{LifecycleState, TeardownFlags, TeardownJoin};

slotmap::new_key_type! {
    /// Identity of a window session
    pub struct SessionId;
}

/// Owner of a window session
///
/// The session keeps a shared handle to its delegate but the delegate never
/// owns sessions, so no reference cycle forms.
pub trait SessionDelegate {
    /// Request context new browsers in `session` are created in
    fn request_context(&self, session: SessionId) -> Option<RequestContext>;

    /// Both the display surface and the content session of `session` are gone
    ///
    /// Fires exactly once per session. The owner may drop the session after
    /// this returns.
    fn on_session_destroyed(&self, session: SessionId);
}

/// Everything a session needs from its environment
///
/// Shared by all sessions of one owner.
pub struct SessionServices {
    /// Process-wide settings provider
    pub context: Rc<MainContext>,
    /// The control thread and its task queue
    pub control: ControlThread,
    /// Builds content sessions
    pub content_factory: Box<dyn ContentSessionFactory>,
    /// Builds display surfaces
    pub surface_factory: Box<dyn SurfaceFactory>,
}

impl SessionServices {
    /// Bundle the services
    pub fn new(
        context: Rc<MainContext>,
        control: ControlThread,
        content_factory: Box<dyn ContentSessionFactory>,
        surface_factory: Box<dyn SurfaceFactory>,
    ) -> Self {
        Self {
            context,
            control,
            content_factory,
            surface_factory,
        }
    }
}

/// Recoverable session errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// The display surface could not be created
    #[error("Display surface creation failed: {0}")]
    Surface(#[from] SurfaceError),

    /// No session with this id is alive
    #[error("Unknown session: {0:?}")]
    UnknownSession(SessionId),
}
