//! Call identifiers and the single-slot session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Opaque, locally generated identifier of one call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// Fresh random identifier in the 8-4-4-4-12 hex layout
    pub fn generate() -> Self {
        CallId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a string has the structural shape of a generated id
    pub fn is_well_formed(value: &str) -> bool {
        let groups: Vec<&str> = value.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        groups.len() == lengths.len()
            && groups
                .iter()
                .zip(lengths)
                .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl From<String> for CallId {
    fn from(value: String) -> Self {
        CallId(value)
    }
}

impl From<&str> for CallId {
    fn from(value: &str) -> Self {
        CallId(value.to_string())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logical call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSession {
    pub call_id: CallId,
    pub handle: String,
    pub display_name: String,
    pub room_id: Option<String>,
    pub started_at: DateTime<Utc>,
}

/// How many ended call ids a slot remembers
pub const ENDED_HISTORY: usize = 16;

/// Holds at most one live session
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<CallSession>,
    ended: VecDeque<CallId>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new session, returning whatever it replaced
    pub fn begin(&mut self, session: CallSession) -> Option<CallSession> {
        self.current.replace(session)
    }

    /// Pick the id an end request refers to: the explicit one, else the stored one
    pub fn resolve_target(&self, explicit: Option<&CallId>) -> Option<CallId> {
        explicit
            .cloned()
            .or_else(|| self.current.as_ref().map(|s| s.call_id.clone()))
    }

    /// Record `call_id` as ended; clear the slot only if it still holds it
    pub fn finish(&mut self, call_id: &CallId) -> Option<CallSession> {
        if !self.ended.contains(call_id) {
            if self.ended.len() == ENDED_HISTORY {
                self.ended.pop_front();
            }
            self.ended.push_back(call_id.clone());
        }
        if self.current_id() == Some(call_id) {
            self.current.take()
        } else {
            None
        }
    }

    /// True when `call_id` was recently ended and is not live
    pub fn already_ended(&self, call_id: &CallId) -> bool {
        self.current_id() != Some(call_id) && self.ended.contains(call_id)
    }

    pub fn current(&self) -> Option<&CallSession> {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> Option<&CallId> {
        self.current.as_ref().map(|s| &s.call_id)
    }

    /// Attach a room code to the live session
    pub fn set_room(&mut self, room_id: Option<String>) {
        if let Some(session) = self.current.as_mut() {
            session.room_id = room_id;
        }
    }

    /// Drop the live session and forget every ended id
    pub fn clear(&mut self) -> Option<CallSession> {
        self.ended.clear();
        self.current.take()
    }
}
