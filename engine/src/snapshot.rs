//! Serialized board snapshots.
//!
//! A snapshot is what gets cached on disk between sessions so a board can be
//! shown before the first fetch completes. It never carries in-flight moves:
//! those belong to the session that issued them.

use crate::model::Board;
use crate::{error::Result, Epoch, Error, Revision};
use serde::{Deserialize, Serialize};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time copy of a store's board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub format_version: u32,
    /// Epoch of the store when the snapshot was taken
    pub epoch: Epoch,
    /// Revision of the store when the snapshot was taken
    pub revision: Revision,
    pub board: Board,
}

impl BoardSnapshot {
    /// Wrap a board at the current format version.
    pub fn new(board: Board, epoch: Epoch, revision: Revision) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            epoch,
            revision,
            board,
        }
    }

    /// Check the format version and the board's ordering invariants.
    pub fn validate(&self) -> Result<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        self.board
            .validate()
            .map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Summary of a snapshot, for logging without the board body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub board_id: i64,
    pub epoch: Epoch,
    pub revision: Revision,
    pub section_count: usize,
    pub card_count: usize,
}

impl From<&BoardSnapshot> for SnapshotMetadata {
    fn from(snapshot: &BoardSnapshot) -> Self {
        Self {
            format_version: snapshot.format_version,
            board_id: snapshot.board.id,
            epoch: snapshot.epoch,
            revision: snapshot.revision,
            section_count: snapshot.board.sections.len(),
            card_count: snapshot.board.card_count(),
        }
    }
}
