//! Save/Load for game state
//!
//! Two formats share the same validation on the way in:
//! - a JSON envelope `{version, timestamp, state}` for interchange
//! - a bincode snapshot for compact local saves
//!
//! A loaded state is only handed back after it passes
//! [`GameState::validate`]; a malformed save never reaches the engine.

use planet_logic::state::{GameState, StateError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Version string written into JSON envelopes
pub const SAVE_VERSION: &str = "1.0.0";

/// Version number for the binary snapshot format (increment when format changes)
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
    #[error("saved state is invalid: {0}")]
    InvalidState(#[from] StateError),
}

/// Versioned JSON save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: String,
    /// Seconds since the unix epoch when the save was written
    pub timestamp: u64,
    pub state: GameState,
}

impl SaveEnvelope {
    pub fn new(state: GameState) -> Self {
        Self {
            version: SAVE_VERSION.to_string(),
            timestamp: unix_now(),
            state,
        }
    }

    /// Check the version and the state invariants, yielding the state.
    pub fn into_state(self) -> Result<GameState, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION.to_string(),
                found: self.version,
            });
        }
        self.state.validate()?;
        Ok(self.state)
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotData {
    version: u32,
    state: GameState,
}

pub fn save_json<W: Write>(writer: W, state: &GameState) -> Result<(), SaveError> {
    serde_json::to_writer_pretty(writer, &SaveEnvelope::new(state.clone()))?;
    Ok(())
}

pub fn load_json<R: Read>(reader: R) -> Result<GameState, SaveError> {
    let envelope: SaveEnvelope = serde_json::from_reader(reader)?;
    envelope.into_state()
}

pub fn to_json_string(state: &GameState) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(&SaveEnvelope::new(state.clone()))?)
}

pub fn from_json_str(source: &str) -> Result<GameState, SaveError> {
    let envelope: SaveEnvelope = serde_json::from_str(source)?;
    envelope.into_state()
}

/// Write a bincode snapshot of `state`.
pub fn save_snapshot<W: Write>(writer: W, state: &GameState) -> Result<(), SaveError> {
    let data = SnapshotData {
        version: SNAPSHOT_VERSION,
        state: state.clone(),
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Read a bincode snapshot written by [`save_snapshot`].
pub fn load_snapshot<R: Read>(reader: R) -> Result<GameState, SaveError> {
    let data: SnapshotData = bincode::deserialize_from(reader)?;
    if data.version != SNAPSHOT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SNAPSHOT_VERSION.to_string(),
            found: data.version.to_string(),
        });
    }
    data.state.validate()?;
    Ok(data.state)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_logic::state::{EnergySource, LogKind};

    fn played_state() -> GameState {
        let mut state = GameState::new();
        state.turn = 7;
        state.credits = 1234;
        state.pollution = 41.5;
        state.temperature = 27.3;
        state.energy.capacity.adjust(EnergySource::Wind, 30);
        state.energy.storage = 12;
        state.cooldowns.decision = 2;
        state.logs.push("Wind farm commissioned", LogKind::Success);
        state
    }

    #[test]
    fn test_json_roundtrip() {
        let state = played_state();
        let mut buf = Vec::new();
        save_json(&mut buf, &state).unwrap();
        let loaded = load_json(&buf[..]).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_json_string_roundtrip() {
        let state = played_state();
        let json = to_json_string(&state).unwrap();
        assert!(json.contains("\"version\": \"1.0.0\""));
        assert_eq!(from_json_str(&json).unwrap(), state);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let state = played_state();
        let mut buf = Vec::new();
        save_snapshot(&mut buf, &state).unwrap();
        assert_eq!(load_snapshot(&buf[..]).unwrap(), state);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut envelope = SaveEnvelope::new(played_state());
        envelope.version = "0.9.0".to_string();
        let json = serde_json::to_string(&envelope).unwrap();
        match from_json_str(&json) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, "0.9.0");
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_state_rejected() {
        let mut state = played_state();
        state.pollution = 180.0;
        let json = serde_json::to_string(&SaveEnvelope::new(state)).unwrap();
        assert!(matches!(
            from_json_str(&json),
            Err(SaveError::InvalidState(StateError::PollutionOutOfRange(_)))
        ));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let json = r#"{"version":"1.0.0","timestamp":0,"state":{"turn":3}}"#;
        assert!(matches!(from_json_str(json), Err(SaveError::Json(_))));
    }

    #[test]
    fn test_truncated_snapshot_rejected() {
        let mut buf = Vec::new();
        save_snapshot(&mut buf, &played_state()).unwrap();
        buf.truncate(buf.len() / 2);
        assert!(matches!(
            load_snapshot(&buf[..]),
            Err(SaveError::Bincode(_))
        ));
    }
}
