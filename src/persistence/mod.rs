//! Save/load of simulated systems
//!
//! Features:
//! - Versioned JSON envelope
//! - Re-validation of every construction invariant on load
//! - Backup rotation (tmp → save, old save → backup)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::sim::System;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk wrapper around a system snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotEnvelope {
    pub version: u32,
    pub system: System,
}

impl ShotEnvelope {
    pub fn new(system: System) -> Self {
        Self { version: SNAPSHOT_VERSION, system }
    }
}

pub fn to_json(system: &System) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(&ShotEnvelope::new(system.clone()))?)
}

/// Parse a snapshot, checking the version before trusting the contents
pub fn from_json(json: &str) -> Result<System, PersistenceError> {
    #[derive(Deserialize)]
    struct Header {
        version: u32,
    }

    let header: Header = serde_json::from_str(json)?;
    if header.version != SNAPSHOT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: header.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let envelope: ShotEnvelope = serde_json::from_str(json)?;
    envelope.system.validate()?;
    Ok(envelope.system)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Path the previous save is rotated to
pub fn backup_path(path: impl AsRef<Path>) -> PathBuf {
    with_suffix(path.as_ref(), ".bak")
}

/// Write a snapshot: temp file first, then rotate any existing save to `.bak`, then
/// rename into place.
pub fn save(system: &System, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let tmp = with_suffix(path, ".tmp");
    fs::write(&tmp, to_json(system)?)?;
    if path.exists() {
        fs::rename(path, backup_path(path))?;
    }
    fs::rename(&tmp, path)?;
    log::info!("Snapshot saved to {} ({} events)", path.display(), system.events().len());
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<System, PersistenceError> {
    let path = path.as_ref();
    let system = from_json(&fs::read_to_string(path)?)?;
    log::info!("Loaded snapshot from {}", path.display());
    Ok(system)
}

/// Load a snapshot, falling back to the backup when the main file is missing or bad
pub fn load_or_backup(path: impl AsRef<Path>) -> Result<System, PersistenceError> {
    let path = path.as_ref();
    match load(path) {
        Ok(system) => Ok(system),
        Err(err) => {
            log::warn!("Snapshot {} unusable ({err}), trying backup", path.display());
            load(backup_path(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;
    use crate::objects::{Ball, BallParams, Cue, Strike, Table};
    use crate::settings::SimSettings;
    use crate::sim::evolve;

    fn shot() -> System {
        let table = Table::pocket_table().unwrap();
        let balls = layout::nine_ball_rack(&table, BallParams::default(), 4).unwrap();
        let mut sys = System::new(balls.into_values(), table, Some(Cue::new("cue"))).unwrap();
        let phi = sys.aim_at_ball("1", None).unwrap();
        sys.strike(Strike { v0: 4.0, phi, ..Default::default() }).unwrap();
        evolve(&mut sys, &SimSettings::default()).unwrap();
        sys
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cue_sim_{name}_{}.json", std::process::id()))
    }

    #[test]
    fn test_json_preserves_log() {
        let sys = shot();
        let back = from_json(&to_json(&sys).unwrap()).unwrap();
        assert_eq!(back.events().len(), sys.events().len());
        assert_eq!(back.pocketed(), sys.pocketed());
        assert!((back.t() - sys.t()).abs() < 1e-12);
    }

    #[test]
    fn test_version_mismatch() {
        let json = to_json(&shot()).unwrap().replacen("\"version\": 1", "\"version\": 99", 1);
        assert!(matches!(
            from_json(&json),
            Err(PersistenceError::UnsupportedVersion { found: 99, expected: 1 })
        ));
    }

    #[test]
    fn test_invalid_contents_rejected() {
        let p = BallParams::default();
        let sys = System::new(
            vec![Ball::new("cue", 0.5, 0.5, p), Ball::new("1", 0.5, 1.0, p)],
            Table::pocket_table().unwrap(),
            None,
        )
        .unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&to_json(&sys).unwrap()).unwrap();
        value["system"]["balls"]["1"]["state"]["r"][1] = serde_json::json!(0.5);
        let json = serde_json::to_string(&value).unwrap();
        assert!(matches!(from_json(&json), Err(PersistenceError::Invalid(_))));
        assert!(matches!(from_json("{not json"), Err(PersistenceError::Json(_))));
    }

    #[test]
    fn test_save_rotates_backup() {
        let path = temp_path("rotate");
        let first = shot();
        let mut second = first.clone();
        second.start_new_shot();

        save(&first, &path).unwrap();
        save(&second, &path).unwrap();
        assert_eq!(load(&path).unwrap().events().len(), 0);
        assert_eq!(load(backup_path(&path)).unwrap().events().len(), first.events().len());

        fs::write(&path, "corrupt").unwrap();
        assert_eq!(load_or_backup(&path).unwrap().events().len(), first.events().len());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(backup_path(&path));
    }
}
