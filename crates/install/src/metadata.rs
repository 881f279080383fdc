//! `config.json` codec. Downstream players parse this file, keep its shape stable.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CONFIG_FILE, InstallError};

/// Per-slot metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Display name shown by the front end. May be empty.
    pub name: String,
}

/// Writes `config.json` into `slot_dir`, replacing any existing file.
pub fn write_game_config(slot_dir: &Path, config: &GameConfig) -> Result<(), InstallError> {
    let path = slot_dir.join(CONFIG_FILE);
    let json = serde_json::to_string(config).map_err(|e| InstallError::Metadata {
        path: path.clone(),
        source: e,
    })?;
    fs::write(&path, json).map_err(|e| InstallError::io(&path, e))?;
    Ok(())
}

/// Reads `config.json` from `slot_dir`.
pub fn read_game_config(slot_dir: &Path) -> Result<GameConfig, InstallError> {
    let path = slot_dir.join(CONFIG_FILE);
    let content = fs::read_to_string(&path).map_err(|e| InstallError::io(&path, e))?;
    serde_json::from_str(&content).map_err(|e| InstallError::Metadata { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_json_shape() {
        let tmp = tempfile::tempdir().unwrap();
        write_game_config(tmp.path(), &GameConfig { name: "Zelda".into() }).unwrap();

        let raw = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "name": "Zelda" }));
    }

    #[test]
    fn unicode_name_is_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GameConfig {
            name: "ポケモン エメラルド".into(),
        };
        write_game_config(tmp.path(), &config).unwrap();

        let bytes = fs::read(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(String::from_utf8(bytes).is_ok());
        assert_eq!(read_game_config(tmp.path()).unwrap(), config);
    }

    #[test]
    fn overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "garbage").unwrap();
        write_game_config(tmp.path(), &GameConfig { name: "".into() }).unwrap();
        assert_eq!(read_game_config(tmp.path()).unwrap().name, "");
    }

    #[test]
    fn read_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_game_config(tmp.path()).unwrap_err();
        assert!(matches!(err, InstallError::Io { .. }));
    }

    #[test]
    fn read_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "{\"title\": 1}").unwrap();
        let err = read_game_config(tmp.path()).unwrap_err();
        assert!(matches!(err, InstallError::Metadata { .. }));
    }
}
