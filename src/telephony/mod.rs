//! Native call-UI integration.
//!
//! Registers the app as a call provider on platforms that offer a system call
//! card, surfaces hang-up events from that UI, and keeps the app marked as
//! available. On every other platform the adapter is inert.

pub mod adapter;
pub mod provider;

// Re-export main types
pub use adapter::TelephonyAdapter;
pub use provider::{
    CallEvent, CallProvider, CallProviderOptions, HandleType, MockCallProvider, ProviderCall,
};
