//! Content session factory

use crate::browser::ContentSession;
use crate::session::{SessionId, SessionServices};

/// Build the owned content session for `session`
///
/// Off-screen settings come from the process-wide main context.
///
/// # Panics
/// Only off-screen rendered content is supported; `with_osr == false` is a
/// contract violation.
pub fn create_content_session(
    services: &SessionServices,
    session: SessionId,
    with_osr: bool,
    startup_url: &str,
) -> Box<dyn ContentSession> {
    assert!(with_osr, "only off-screen rendered content sessions are supported");

    let settings = services.context.populate_osr_settings();
    log::debug!(
        "Creating content session for {:?} (url: {:?}, frame rate: {})",
        session,
        startup_url,
        settings.windowless_frame_rate
    );
    services.content_factory.create(session, startup_url, settings)
}
