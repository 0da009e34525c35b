//! Session controller.
//!
//! - `session_controller`: The single entry point for UI intents and collaborator pushes (`SessionController`)
//! - `replies`: Outbound sequencing and the waiting flag (`ReplyTracker`)
//! - `notice`: User-visible, non-fatal notices (`Notice`)

mod notice;
mod replies;
mod session_controller;

pub use notice::{Notice, NoticeLevel};
pub use replies::{PendingRequest, ReplyTracker};
pub use session_controller::{PushDisposition, SessionController};
