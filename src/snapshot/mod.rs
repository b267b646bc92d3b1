//! Snapshot and restore for bound instances.
//!
//! This module provides serialization and deserialization capabilities for
//! instances, enabling long-lived entities to survive process restarts.
//! Snapshots capture the cell (state, commit version, transition log) but
//! never the definition: guards and actions are closures and do not
//! serialize, so restoring takes the definition again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{State, TransitionLog};

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable snapshot of a bound instance's cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct InstanceSnapshot<S: State> {
    /// Snapshot format version
    pub version: u32,

    /// Entity the instance is bound to
    pub entity: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// State at capture time
    pub state: S,

    /// Commit version at capture time
    pub commit_version: u64,

    /// Committed transitions up to capture time
    pub log: TransitionLog<S>,
}

impl<S: State> InstanceSnapshot<S> {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from a JSON string, rejecting unsupported versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate_version()?;
        Ok(snapshot)
    }

    /// Serialize to compact binary bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from binary bytes, rejecting unsupported versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate_version()?;
        Ok(snapshot)
    }

    fn validate_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}
