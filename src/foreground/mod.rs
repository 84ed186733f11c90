//! Foreground presence signal.
//!
//! Keeps a persistent notification up for the duration of a call on
//! platforms that lack a native call card, with a "Leave" button routed back
//! into the app.

pub mod descriptor;
pub mod presence;
pub mod service;

// Re-export main types
pub use descriptor::{
    ForegroundAction, ForegroundEvent, ForegroundNotification, ForegroundOptions,
    FOREGROUND_ACTION_LEAVE, FOREGROUND_ACTION_OPEN, FOREGROUND_COLOR, FOREGROUND_NOTIFICATION_ID,
};
pub use presence::{ForegroundHandlers, ForegroundPresence};
pub use service::{ForegroundOp, ForegroundService, MockForegroundService, ServiceCall};
