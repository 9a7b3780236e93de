//! Identifier and snapshot types shared by the registry and its callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of a process tracked by a [`ProcessRegistry`](crate::ProcessRegistry).
///
/// Generated at start time; never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(Uuid);

impl ProcessId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProcessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProcessId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for ProcessId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Point-in-time description of a tracked process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub id: ProcessId,
    /// OS process id of the direct child
    pub pid: u32,
    pub program: String,
    pub arguments: String,
    pub started_at: DateTime<Utc>,
    pub exited: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_ids_are_unique() {
        let a = ProcessId::new();
        let b = ProcessId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_process_id_display_parse() {
        let id = ProcessId::new();
        let parsed: ProcessId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_process_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<ProcessId>().is_err());
    }

    #[test]
    fn test_process_id_serializes_as_plain_string() {
        let id = ProcessId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
