//! Install request value collected from the front end.

use std::path::{Path, PathBuf};

use crate::{Device, InstallError};

/// Everything needed for one install, gathered before the install starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    rom_source: PathBuf,
    cover_source: Option<PathBuf>,
    game_name: String,
    device: Device,
    destination_root: PathBuf,
}

impl InstallRequest {
    /// Creates a request without a cover image and with an empty game name.
    pub fn new(
        rom_source: impl Into<PathBuf>,
        device: Device,
        destination_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rom_source: rom_source.into(),
            cover_source: None,
            game_name: String::new(),
            device,
            destination_root: destination_root.into(),
        }
    }

    /// Sets the display name written to `config.json`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.game_name = name.into();
        self
    }

    /// Sets the cover image source.
    pub fn with_cover(mut self, cover: impl Into<PathBuf>) -> Self {
        self.cover_source = Some(cover.into());
        self
    }

    pub fn rom_source(&self) -> &Path {
        &self.rom_source
    }

    pub fn cover_source(&self) -> Option<&Path> {
        self.cover_source.as_deref()
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Checks every input without touching the filesystem beyond metadata lookups.
    pub(crate) fn validate(&self) -> Result<(), InstallError> {
        if self.rom_source.as_os_str().is_empty() {
            return Err(InstallError::InvalidInput("no ROM file selected".into()));
        }
        if !self.rom_source.is_file() {
            return Err(InstallError::InvalidInput(format!(
                "ROM file not found: {}",
                self.rom_source.display()
            )));
        }

        if self.destination_root.as_os_str().is_empty() {
            return Err(InstallError::InvalidInput("no public folder selected".into()));
        }
        if !self.destination_root.is_dir() {
            return Err(InstallError::InvalidInput(format!(
                "public folder is not a directory: {}",
                self.destination_root.display()
            )));
        }

        if let Some(cover) = &self.cover_source
            && !cover.is_file()
        {
            return Err(InstallError::InvalidInput(format!(
                "cover image not found: {}",
                cover.display()
            )));
        }

        Ok(())
    }
}
