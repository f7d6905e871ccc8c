//! Messages crossing the worker-thread boundary
//!
//! The image fetch runs off the UI thread; its outcome comes back as a
//! message that the preview controller consumes on its own turn.

pub mod messages;

pub use messages::FetchEvent;
