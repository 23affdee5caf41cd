//! Stream identifiers and request discriminators
//!
//! Small value types that cross the worker RPC boundary. All of them are
//! `Copy` and serde-serializable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel for a stream of unknown/unbounded length.
pub const UNKNOWN_LENGTH: u64 = u64::MAX;

/// Identifier of the target block (or underlying-storage file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl BlockId {
    /// Create a new BlockId
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for BlockId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// Identifier of the session a remote writer runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Create a new SessionId
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SessionId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Kind of write request a remote writer performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteRequestKind {
    /// Write into a managed block
    #[default]
    Block,
    /// Write through to the underlying storage system
    UnderlyingStorage,
}
