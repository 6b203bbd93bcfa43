//! # Session Identity
//!
//! One opaque identifier per widget lifetime. All traffic on both
//! transports carries this identifier so the backend correlates it to one
//! conversation. Regenerated only on a full restart or an explicit session
//! reset, never on reconnect.

use std::fmt;

use uuid::Uuid;

/// Opaque session identifier (UUID v4 under the hood).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh, collision-negligible identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
