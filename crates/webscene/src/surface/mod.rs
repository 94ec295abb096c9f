//! Display surface management
//!
//! A display surface is the native window that hosts a session's rendered
//! content. The coordinator only sees the [`DisplaySurface`] trait; concrete
//! surfaces live in [`backend`](crate::backend).
//!
//! ```text
//! ┌───────────────────────────┐
//! │ WindowSession             │
//! └─────────────┬─────────────┘
//!               │ Uses
//!      ┌────────▼────────┐
//!      │ DisplaySurface  │ ← trait (this module)
//!      └────────┬────────┘
//!               │ Implemented by
//!   ┌───────────▼───────────┐
//!   │ headless::Surface     │ ← always available
//!   │ glfw_surface::Surface │ ← `glfw-backend` feature
//!   └───────────────────────┘
//! ```
//!
//! Surfaces report back asynchronously: a non-forced [`close`](DisplaySurface::close)
//! posts `ControlTask::CloseRequested`, and destruction posts
//! `ControlTask::DisplaySurfaceDestroyed`.

use std::rc::Rc;

use thiserror::Error;

use crate::foundation::geometry::Rect;
use crate::session::SessionId;

/// Opaque identifier of a native surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// How a surface is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowMode {
    /// Restored, normal size
    #[default]
    Normal,
    /// Iconified
    Minimized,
    /// Maximized
    Maximized,
}

/// Display surface errors
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// Windowing system initialization failed
    #[error("Windowing system initialization failed: {0}")]
    InitializationFailed(String),

    /// Surface creation failed
    #[error("Surface creation failed: {0}")]
    CreationFailed(String),
}

/// Native window hosting one session
pub trait DisplaySurface {
    /// Native handle, used to parent browsers
    fn handle(&self) -> SurfaceHandle;

    /// Show the surface
    fn show(&mut self, mode: ShowMode);

    /// Hide the surface
    fn hide(&mut self);

    /// Move and resize the surface
    fn set_bounds(&mut self, rect: Rect);

    /// Current surface rectangle
    fn bounds(&self) -> Rect;

    /// Close the surface
    ///
    /// `force == false` asks politely (the request comes back as
    /// `ControlTask::CloseRequested`); `force == true` destroys the surface.
    fn close(&mut self, force: bool);

    /// Set the title text
    fn set_title(&mut self, title: &str);

    /// Enter or leave fullscreen
    fn set_fullscreen(&mut self, fullscreen: bool);
}

/// Creates display surfaces on the control thread
pub trait SurfaceFactory {
    /// Create the surface for `session`
    fn create_surface(
        &self,
        session: SessionId,
        rect: Rect,
        is_popup: bool,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError>;

    /// Hidden placeholder surface popups are parented to until realized
    fn placeholder_handle(&self) -> SurfaceHandle;
}

impl<T: SurfaceFactory + ?Sized> SurfaceFactory for Rc<T> {
    fn create_surface(
        &self,
        session: SessionId,
        rect: Rect,
        is_popup: bool,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError> {
        (**self).create_surface(session, rect, is_popup)
    }

    fn placeholder_handle(&self) -> SurfaceHandle {
        (**self).placeholder_handle()
    }
}
