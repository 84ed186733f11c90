//! # conclave_call
//!
//! Call-session lifecycle coordinator for the Conclave mobile client.
//!
//! ## Features
//!
//! - **Session Manager**: at most one active call id, idempotent start/end
//! - **Telephony Integration**: native call card and hang-up events where the platform offers them
//! - **Foreground Presence**: persistent "call in progress" notification with a Leave button
//! - **Audio Routing**: loudspeaker/earpiece switching for the active call
//!
//! Every native integration is optional. When one is missing or fails, the
//! coordinator degrades the call UX and carries on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use conclave_call::{CallCoordinator, Platform};
//! use conclave_call::foreground::ForegroundOptions;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let coordinator = CallCoordinator::builder(Platform::Android).build();
//! coordinator.ensure_call_keep().await;
//!
//! let call_id = coordinator.start_call_session("room-42", "Alice");
//! coordinator.start_in_call();
//! coordinator
//!     .start_foreground_call_service(Some(&ForegroundOptions::for_room("ABCD")))
//!     .await;
//!
//! coordinator.end_call_session(Some(&call_id));
//! coordinator.stop_foreground_call_service().await;
//! coordinator.stop_in_call();
//! # }
//! ```

pub mod audio;
pub mod capability;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod foreground;
pub mod logging;
pub mod platform;
pub mod session;
pub mod subscription;
pub mod telephony;

// Re-export commonly used types
pub use audio::AudioRoute;
pub use capability::Outcome;
pub use config::CallConfig;
pub use coordinator::CallCoordinator;
pub use error::{Error, Result};
pub use platform::Platform;
pub use session::{CallId, CallSession};
pub use subscription::Subscription;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
