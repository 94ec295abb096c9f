//! Window management using GLFW
//!
//! Hosts display surfaces in real native windows. No client API context is
//! created; the host's GPU pipeline presents into the window itself.
//!
//! Native window events are turned into `ControlTask`s by
//! [`GlfwSurfaceFactory::poll_events`], which the main loop calls once per
//! frame on the control thread.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glfw::WindowEvent;

use crate::control::{ControlPoster, ControlTask};
use crate::foundation::geometry::Rect;
use crate::session::SessionId;
use crate::surface::{DisplaySurface, ShowMode, SurfaceError, SurfaceFactory, SurfaceHandle};

struct NativeWindow {
    session: SessionId,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
}

/// Creates glfw-backed display surfaces
pub struct GlfwSurfaceFactory {
    glfw: RefCell<glfw::Glfw>,
    // Hidden window popups are parented to until their own surface exists
    _placeholder: glfw::PWindow,
    windows: RefCell<Vec<Weak<RefCell<NativeWindow>>>>,
    poster: ControlPoster,
    next_handle: Cell<u64>,
}

impl GlfwSurfaceFactory {
    /// Initialize glfw and create the placeholder window
    pub fn new(poster: ControlPoster) -> Result<Self, SurfaceError> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| SurfaceError::InitializationFailed(format!("{e:?}")))?;

        // The host renderer owns presentation (no OpenGL context)
        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(true));
        glfw.window_hint(glfw::WindowHint::Visible(false));

        let (placeholder, _) = glfw
            .create_window(1, 1, "webscene", glfw::WindowMode::Windowed)
            .ok_or_else(|| SurfaceError::CreationFailed("placeholder window".to_string()))?;

        Ok(Self {
            glfw: RefCell::new(glfw),
            _placeholder: placeholder,
            windows: RefCell::new(Vec::new()),
            poster,
            next_handle: Cell::new(1),
        })
    }

    /// Pump native events and forward them to the control queue
    pub fn poll_events(&self) {
        self.glfw.borrow_mut().poll_events();

        let mut windows = self.windows.borrow_mut();
        windows.retain(|window| window.strong_count() > 0);

        for native in windows.iter().filter_map(Weak::upgrade) {
            let mut native = native.borrow_mut();
            let events: Vec<WindowEvent> = glfw::flush_messages(&native.events)
                .map(|(_, event)| event)
                .collect();
            let session = native.session;

            for event in events {
                match event {
                    WindowEvent::Close => {
                        // The coordinator decides whether the window really closes
                        native.window.set_should_close(false);
                        self.poster.post(ControlTask::CloseRequested { session });
                    }
                    WindowEvent::Size(..) => {
                        self.poster.post(ControlTask::Resized { session, minimized: false });
                    }
                    WindowEvent::Iconify(minimized) => {
                        self.poster.post(ControlTask::Resized { session, minimized });
                    }
                    WindowEvent::Pos(..) => {
                        self.poster.post(ControlTask::Moved { session });
                    }
                    WindowEvent::Focus(true) => {
                        self.poster.post(ControlTask::Focused { session });
                    }
                    _ => {}
                }
            }
        }
    }
}

impl SurfaceFactory for GlfwSurfaceFactory {
    fn create_surface(
        &self,
        session: SessionId,
        rect: Rect,
        is_popup: bool,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError> {
        let width = u32::try_from(rect.width().max(1)).unwrap_or(1);
        let height = u32::try_from(rect.height().max(1)).unwrap_or(1);
        let title = if is_popup { "webscene popup" } else { "webscene" };

        let (mut window, events) = self
            .glfw
            .borrow_mut()
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or_else(|| SurfaceError::CreationFailed(format!("{width}x{height} window for {session:?}")))?;

        window.set_pos(rect.left, rect.top);
        window.set_close_polling(true);
        window.set_size_polling(true);
        window.set_pos_polling(true);
        window.set_focus_polling(true);
        window.set_iconify_polling(true);

        let handle = SurfaceHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        log::debug!("Created glfw surface {:?} for {:?}", handle, session);

        let native = Rc::new(RefCell::new(NativeWindow { session, window, events }));
        self.windows.borrow_mut().push(Rc::downgrade(&native));

        Ok(Box::new(GlfwSurface {
            handle,
            native,
            poster: self.poster.clone(),
            destroyed: false,
        }))
    }

    fn placeholder_handle(&self) -> SurfaceHandle {
        SurfaceHandle(0)
    }
}

/// Display surface backed by a glfw window
///
/// The native window is destroyed when the surface is dropped.
pub struct GlfwSurface {
    handle: SurfaceHandle,
    native: Rc<RefCell<NativeWindow>>,
    poster: ControlPoster,
    destroyed: bool,
}

impl DisplaySurface for GlfwSurface {
    fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    fn show(&mut self, mode: ShowMode) {
        let mut native = self.native.borrow_mut();
        let window = &mut native.window;
        match mode {
            ShowMode::Normal => window.restore(),
            ShowMode::Minimized => window.iconify(),
            ShowMode::Maximized => window.maximize(),
        }
        window.show();
    }

    fn hide(&mut self) {
        self.native.borrow_mut().window.hide();
    }

    fn set_bounds(&mut self, rect: Rect) {
        let mut native = self.native.borrow_mut();
        let window = &mut native.window;
        window.set_pos(rect.left, rect.top);
        window.set_size(rect.width().max(1), rect.height().max(1));
    }

    fn bounds(&self) -> Rect {
        let native = self.native.borrow();
        let (x, y) = native.window.get_pos();
        let (width, height) = native.window.get_size();
        Rect::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    fn close(&mut self, force: bool) {
        if self.destroyed {
            return;
        }
        let session = self.native.borrow().session;
        if force {
            self.destroyed = true;
            self.native.borrow_mut().window.hide();
            self.poster.post(ControlTask::DisplaySurfaceDestroyed { session });
        } else {
            self.poster.post(ControlTask::CloseRequested { session });
        }
    }

    fn set_title(&mut self, title: &str) {
        self.native.borrow_mut().window.set_title(title);
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        // Borderless monitor takeover is left to the host; maximize instead
        let mut native = self.native.borrow_mut();
        let window = &mut native.window;
        if fullscreen {
            window.maximize();
        } else {
            window.restore();
        }
    }
}
