//! Installer configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/emuweb/installer.toml`
//! - Windows: `%APPDATA%/emuweb/installer.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Installer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Public folder used when `--public` is not given. Empty means unset.
    #[serde(default = "default_public_folder")]
    pub public_folder: String,

    /// Move ROMs into their slot instead of copying them.
    #[serde(default = "default_move_rom")]
    pub move_rom: bool,
}

fn default_public_folder() -> String {
    String::new()
}

fn default_move_rom() -> bool {
    false
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_folder: default_public_folder(),
            move_rom: default_move_rom(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Picks the public folder: command line first, then config.
    pub fn public_folder(&self, cli: Option<PathBuf>) -> Option<PathBuf> {
        cli.or_else(|| {
            (!self.public_folder.is_empty()).then(|| PathBuf::from(&self.public_folder))
        })
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("emuweb")
            .join("installer.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("emuweb").join("installer.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/emuweb/installer.toml"))
    }
}
