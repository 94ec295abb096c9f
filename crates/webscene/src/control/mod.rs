//! Control thread discipline
//!
//! Every session and display-surface mutation happens on one designated
//! control thread. Code running anywhere else (engine callbacks, loader
//! threads) never touches session state directly; it posts a [`ControlTask`]
//! through a [`ControlPoster`] and the owner drains the queue on the control
//! thread.
//!
//! ```text
//!  engine thread(s)                     control thread
//! ┌──────────────────┐   ControlTask   ┌───────────────────────────┐
//! │ ControlPoster    │ ──────────────► │ ControlThread::try_next() │
//! │  (Clone + Send)  │   crossbeam     │  → WindowManager::pump()  │
//! └──────────────────┘                 └───────────────────────────┘
//! ```

use std::cell::Cell;
use std::thread::{self, ThreadId};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::browser::LoadingState;
use crate::core::config::BrowserSettings;
use crate::session::SessionId;

/// Work marshalled onto the control thread
#[derive(Debug, Clone, PartialEq)]
pub enum ControlTask {
    /// Realize a session's display surface (deferred from initialization)
    RealizeDisplaySurface {
        /// Target session
        session: SessionId,
        /// Browser settings captured at initialization
        settings: BrowserSettings,
    },
    /// The engine finished creating the session's browser
    ContentSessionReady {
        /// Target session
        session: SessionId,
    },
    /// The engine tore down the session's content
    ContentSessionDestroyed {
        /// Target session
        session: SessionId,
    },
    /// The windowing layer destroyed the session's display surface
    DisplaySurfaceDestroyed {
        /// Target session
        session: SessionId,
    },
    /// The user (or the windowing layer) asked to close the surface
    CloseRequested {
        /// Target session
        session: SessionId,
    },
    /// The surface gained focus
    Focused {
        /// Target session
        session: SessionId,
    },
    /// The surface moved on screen
    Moved {
        /// Target session
        session: SessionId,
    },
    /// The surface was resized or minimized
    Resized {
        /// Target session
        session: SessionId,
        /// Whether the surface is now minimized
        minimized: bool,
    },
    /// Content navigated to a new address
    AddressChanged {
        /// Target session
        session: SessionId,
        /// New address
        url: String,
    },
    /// Content changed its title
    TitleChanged {
        /// Target session
        session: SessionId,
        /// New title
        title: String,
    },
    /// Content entered or left fullscreen
    FullscreenChanged {
        /// Target session
        session: SessionId,
        /// Whether content is fullscreen
        fullscreen: bool,
    },
    /// Content loading state changed
    LoadingStateChanged {
        /// Target session
        session: SessionId,
        /// New loading state
        state: LoadingState,
    },
}

impl ControlTask {
    /// Session the task is addressed to
    pub fn session(&self) -> SessionId {
        match self {
            Self::RealizeDisplaySurface { session, .. }
            | Self::ContentSessionReady { session }
            | Self::ContentSessionDestroyed { session }
            | Self::DisplaySurfaceDestroyed { session }
            | Self::CloseRequested { session }
            | Self::Focused { session }
            | Self::Moved { session }
            | Self::Resized { session, .. }
            | Self::AddressChanged { session, .. }
            | Self::TitleChanged { session, .. }
            | Self::FullscreenChanged { session, .. }
            | Self::LoadingStateChanged { session, .. } => *session,
        }
    }
}

/// The designated control thread and its task queue
pub struct ControlThread {
    thread: Cell<ThreadId>,
    sender: Sender<ControlTask>,
    receiver: Receiver<ControlTask>,
}

impl ControlThread {
    /// Designate the calling thread as the control thread
    pub fn current() -> Self {
        Self::for_thread(thread::current().id())
    }

    /// Designate a specific thread as the control thread
    pub fn for_thread(thread: ThreadId) -> Self {
        let (sender, receiver) = unbounded();
        log::debug!("Control thread designated: {:?}", thread);
        Self {
            thread: Cell::new(thread),
            sender,
            receiver,
        }
    }

    /// Whether the caller is running on the control thread
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread.get()
    }

    /// Identity of the control thread
    pub fn thread_id(&self) -> ThreadId {
        self.thread.get()
    }

    /// Hand the control role to the calling thread
    ///
    /// Used when the queue is set up before the thread that runs the main
    /// loop takes over. Tasks already queued stay queued.
    pub fn rebind_to_current(&self) {
        let current = thread::current().id();
        log::debug!("Control thread rebound: {:?} -> {:?}", self.thread.get(), current);
        self.thread.set(current);
    }

    /// Handle other threads use to post tasks
    pub fn poster(&self) -> ControlPoster {
        ControlPoster {
            sender: self.sender.clone(),
        }
    }

    /// Post a task to the queue
    pub fn post(&self, task: ControlTask) {
        log::trace!("Posting {:?}", task);
        // The receiver lives in `self`, so the send cannot fail
        let _ = self.sender.send(task);
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Take the next queued task
    ///
    /// # Panics
    /// Panics when called off the control thread.
    pub fn try_next(&self) -> Option<ControlTask> {
        assert!(self.is_current(), "control tasks must be drained on the control thread");
        self.receiver.try_recv().ok()
    }
}

impl std::fmt::Debug for ControlThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlThread")
            .field("thread", &self.thread.get())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Cloneable, thread-safe handle for posting onto the control thread
#[derive(Debug, Clone)]
pub struct ControlPoster {
    sender: Sender<ControlTask>,
}

impl ControlPoster {
    /// Post a task; returns `false` if the control thread is gone
    pub fn post(&self, task: ControlTask) -> bool {
        log::trace!("Posting {:?}", task);
        self.sender.send(task).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn session_id(n: u64) -> SessionId {
        SessionId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn test_current_thread_is_control() {
        let control = ControlThread::current();
        assert!(control.is_current());
        assert_eq!(control.thread_id(), thread::current().id());
    }

    #[test]
    fn test_other_thread_is_not_control() {
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        let control = ControlThread::for_thread(other);
        assert!(!control.is_current());
    }

    #[test]
    fn test_rebind_to_current() {
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        let control = ControlThread::for_thread(other);
        control.post(ControlTask::Focused { session: session_id(3) });

        control.rebind_to_current();
        assert!(control.is_current());
        assert_eq!(control.pending(), 1);
        assert!(control.try_next().is_some());
    }

    #[test]
    fn test_post_from_worker_thread() {
        let control = ControlThread::current();
        let poster = control.poster();
        let session = session_id(1);

        thread::spawn(move || {
            assert!(poster.post(ControlTask::Focused { session }));
            assert!(poster.post(ControlTask::Moved { session }));
        })
        .join()
        .unwrap();

        assert_eq!(control.pending(), 2);
        assert_eq!(control.try_next(), Some(ControlTask::Focused { session }));
        assert_eq!(control.try_next(), Some(ControlTask::Moved { session }));
        assert_eq!(control.try_next(), None);
    }

    #[test]
    fn test_poster_reports_closed_queue() {
        let poster = ControlThread::current().poster();
        assert!(!poster.post(ControlTask::Focused { session: session_id(1) }));
    }

    #[test]
    #[should_panic(expected = "control thread")]
    fn test_drain_off_thread_panics() {
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        ControlThread::for_thread(other).try_next();
    }

    #[test]
    fn test_task_session_accessor() {
        let session = session_id(7);
        let task = ControlTask::TitleChanged { session, title: "Docs".to_string() };
        assert_eq!(task.session(), session);
    }
}
