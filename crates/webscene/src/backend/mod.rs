//! Concrete engine and windowing backends
//!
//! - **`headless`**: In-process fakes that record calls; always available
//! - **`glfw_surface`**: Native display surfaces (`glfw-backend` feature)

pub mod headless;

#[cfg(feature = "glfw-backend")]
pub mod glfw_surface;
