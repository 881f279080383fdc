//! ROM installation for EmulatorWeb public folders.
//!
//! Games are laid out as `<public>/rom/<DEVICE>/<slot>/`, each slot holding
//! the ROM under a canonical name, an optional `cover.png` and a
//! `config.json` with the display name.

mod cover;
mod device;
mod install;
mod metadata;
mod request;
mod slot;

use std::path::PathBuf;

pub use cover::{CoverImage, normalize_cover_image};
pub use device::Device;
pub use install::{
    CoverOutcome, InstallOutcome, InstallOptions, InstalledGameEntry, Installer, RomTransfer,
    install, installed_games,
};
pub use metadata::{GameConfig, read_game_config, write_game_config};
pub use request::InstallRequest;
pub use slot::{MAX_SLOT_CLAIM_ATTEMPTS, claim_slot, device_dir, next_free_slot};

/// Directory under the public folder that holds all device categories.
pub const ROM_DIR: &str = "rom";

/// Cover image filename inside a slot.
pub const COVER_FILE: &str = "cover.png";

/// Metadata filename inside a slot.
pub const CONFIG_FILE: &str = "config.json";

/// Errors for install operations.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("slot already taken: {}", path.display())]
    SlotAllocationRace { path: PathBuf },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot convert cover image {}: {reason}", path.display())]
    ImageConversion { path: PathBuf, reason: String },

    #[error("metadata error at {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl InstallError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::Io {
            path: path.into(),
            source,
        }
    }
}
