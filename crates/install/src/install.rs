//! The install operation and the read-side listing of installed games.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::metadata::{GameConfig, read_game_config, write_game_config};
use crate::{COVER_FILE, Device, InstallError, InstallRequest, cover, slot};

/// How the ROM reaches its slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RomTransfer {
    /// Copy the source, leaving it in place.
    #[default]
    Copy,
    /// Move the source into the slot.
    Move,
}

/// Installer settings that do not vary per request.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub rom_transfer: RomTransfer,
}

/// What happened to the cover image of an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOutcome {
    NotProvided,
    Copied,
    Transcoded { from: ImageFormat },
    /// The image could not be converted. The rest of the slot is installed.
    Failed { reason: String },
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub slot_id: u32,
    pub slot_dir: PathBuf,
    pub rom_path: PathBuf,
    pub cover: CoverOutcome,
}

/// A slot found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledGameEntry {
    pub slot_id: u32,
    pub slot_dir: PathBuf,
    /// Name from `config.json`, `None` when missing or unreadable.
    pub name: Option<String>,
    pub rom_file: Option<PathBuf>,
    pub has_cover: bool,
}

/// Places games into numbered slots of a public folder.
#[derive(Debug, Clone, Default)]
pub struct Installer {
    options: InstallOptions,
}

impl Installer {
    /// Creates an installer that copies ROMs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an installer with custom options.
    pub fn with_options(options: InstallOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    /// Installs one game.
    ///
    /// Steps: validate, claim a slot, place the ROM, place the cover, write
    /// `config.json`. Nothing is created when validation fails. A failure
    /// after the slot is claimed leaves the partial slot in place. A cover
    /// that cannot be converted is reported in [`InstallOutcome::cover`]
    /// instead of failing the install.
    pub fn install(&self, request: &InstallRequest) -> Result<InstallOutcome, InstallError> {
        request.validate()?;

        let device = request.device();
        let base = slot::device_dir(request.destination_root(), device);
        let (slot_id, slot_dir) = slot::claim_slot(&base)?;

        let rom_path = slot_dir.join(canonical_rom_name(device, slot_id, request.rom_source()));
        self.place_rom(request.rom_source(), &rom_path)?;
        tracing::debug!(slot_id, path = %rom_path.display(), "placed ROM");

        let cover = match request.cover_source() {
            Some(src) => place_cover(src, &slot_dir)?,
            None => CoverOutcome::NotProvided,
        };

        write_game_config(
            &slot_dir,
            &GameConfig {
                name: request.game_name().to_string(),
            },
        )?;

        tracing::info!(
            slot_id,
            device = %device,
            name = request.game_name(),
            "game installed"
        );

        Ok(InstallOutcome {
            slot_id,
            slot_dir,
            rom_path,
            cover,
        })
    }

    fn place_rom(&self, src: &Path, dest: &Path) -> Result<(), InstallError> {
        match self.options.rom_transfer {
            RomTransfer::Copy => {
                fs::copy(src, dest).map_err(|e| InstallError::io(dest, e))?;
            }
            RomTransfer::Move => {
                if let Err(e) = fs::rename(src, dest) {
                    // Rename fails across filesystems.
                    tracing::debug!(error = %e, "rename failed, copying instead");
                    fs::copy(src, dest).map_err(|e| InstallError::io(dest, e))?;
                    fs::remove_file(src).map_err(|e| InstallError::io(src, e))?;
                }
            }
        }
        Ok(())
    }
}

/// Installs one game with default options. See [`Installer::install`].
pub fn install(request: &InstallRequest) -> Result<InstallOutcome, InstallError> {
    Installer::new().install(request)
}

fn place_cover(src: &Path, slot_dir: &Path) -> Result<CoverOutcome, InstallError> {
    let image = match cover::normalize_cover_image(src) {
        Ok(image) => image,
        Err(InstallError::ImageConversion { path, reason }) => {
            tracing::warn!(path = %path.display(), %reason, "skipping cover image");
            return Ok(CoverOutcome::Failed { reason });
        }
        Err(e) => return Err(e),
    };

    let path = image.write_to(slot_dir)?;
    tracing::debug!(path = %path.display(), format = ?image.source_format(), "placed cover");

    Ok(match image {
        cover::CoverImage::Copied { .. } => CoverOutcome::Copied,
        cover::CoverImage::Transcoded { from, .. } => CoverOutcome::Transcoded { from },
    })
}

/// Returns `<DEVICE><slot>` plus the source extension, e.g. `GBA3.gba`.
fn canonical_rom_name(device: Device, slot_id: u32, src: &Path) -> String {
    let stem = canonical_rom_stem(device, slot_id);
    match src.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem,
    }
}

fn canonical_rom_stem(device: Device, slot_id: u32) -> String {
    format!("{}{slot_id}", device.code())
}

/// Lists installed games of a device category, in slot order.
///
/// A public folder without that category yields an empty list.
pub fn installed_games(
    destination_root: &Path,
    device: Device,
) -> Result<Vec<InstalledGameEntry>, InstallError> {
    let base = slot::device_dir(destination_root, device);
    let entries = match fs::read_dir(&base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(InstallError::io(&base, e)),
    };

    let mut games: Vec<InstalledGameEntry> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let slot_id = parse_slot_name(entry.file_name().to_str()?)?;
            Some(read_slot(device, slot_id, entry.path()))
        })
        .collect();

    games.sort_by_key(|g| g.slot_id);
    Ok(games)
}

/// Accepts only names the allocator itself produces: `1`, `2`, ... without
/// sign or leading zeros.
fn parse_slot_name(name: &str) -> Option<u32> {
    let slot_id = name.parse::<u32>().ok()?;
    (slot_id > 0 && slot_id.to_string() == name).then_some(slot_id)
}

fn read_slot(device: Device, slot_id: u32, slot_dir: PathBuf) -> InstalledGameEntry {
    let name = match read_game_config(&slot_dir) {
        Ok(config) => Some(config.name),
        Err(e) => {
            tracing::debug!(slot_id, error = %e, "slot has no readable config");
            None
        }
    };

    let stem = canonical_rom_stem(device, slot_id);
    let rom_file = fs::read_dir(&slot_dir).ok().and_then(|entries| {
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| {
                path.is_file() && path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str())
            })
    });

    InstalledGameEntry {
        has_cover: slot_dir.join(COVER_FILE).is_file(),
        slot_id,
        slot_dir,
        name,
        rom_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CONFIG_FILE;

    fn rom(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"\x2e\x00\x00\xearom-bytes").unwrap();
        path
    }

    #[test]
    fn canonical_name_keeps_extension() {
        assert_eq!(
            canonical_rom_name(Device::Gba, 3, Path::new("/roms/Metroid Fusion.gba")),
            "GBA3.gba"
        );
        assert_eq!(
            canonical_rom_name(Device::Ds, 12, Path::new("/roms/game.tar.nds")),
            "DS12.nds"
        );
    }

    #[test]
    fn canonical_name_without_extension() {
        assert_eq!(canonical_rom_name(Device::Ds, 1, Path::new("/roms/rawdump")), "DS1");
    }

    #[test]
    fn slot_names_must_be_canonical() {
        assert_eq!(parse_slot_name("1"), Some(1));
        assert_eq!(parse_slot_name("42"), Some(42));
        assert_eq!(parse_slot_name("0"), None);
        assert_eq!(parse_slot_name("01"), None);
        assert_eq!(parse_slot_name("+1"), None);
        assert_eq!(parse_slot_name("1 "), None);
        assert_eq!(parse_slot_name("notes"), None);
    }

    #[test]
    fn install_places_all_artifacts() {
        let src = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        let rom_src = rom(src.path(), "Golden Sun.gba");

        let req = InstallRequest::new(&rom_src, Device::Gba, public.path()).with_name("Golden Sun");
        let outcome = install(&req).unwrap();

        assert_eq!(outcome.slot_id, 1);
        assert_eq!(outcome.slot_dir, public.path().join("rom").join("GBA").join("1"));
        assert_eq!(outcome.rom_path, outcome.slot_dir.join("GBA1.gba"));
        assert_eq!(outcome.cover, CoverOutcome::NotProvided);
        assert_eq!(fs::read(&outcome.rom_path).unwrap(), fs::read(&rom_src).unwrap());
        assert!(rom_src.exists(), "copy mode keeps the source");
        assert!(!outcome.slot_dir.join(COVER_FILE).exists());

        let config = read_game_config(&outcome.slot_dir).unwrap();
        assert_eq!(config.name, "Golden Sun");
    }

    #[test]
    fn install_move_removes_source() {
        let src = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        let rom_src = rom(src.path(), "game.nds");

        let installer = Installer::with_options(InstallOptions {
            rom_transfer: RomTransfer::Move,
        });
        let outcome = installer
            .install(&InstallRequest::new(&rom_src, Device::Ds, public.path()))
            .unwrap();

        assert!(!rom_src.exists());
        assert!(outcome.rom_path.is_file());
        assert!(outcome.rom_path.ends_with("DS1.nds"));
    }

    #[test]
    fn install_invalid_input_creates_nothing() {
        let public = tempfile::tempdir().unwrap();
        let req = InstallRequest::new("", Device::Gba, public.path());

        let err = install(&req).unwrap_err();
        assert!(matches!(err, InstallError::InvalidInput(_)));
        assert_eq!(fs::read_dir(public.path()).unwrap().count(), 0);
    }

    #[test]
    fn install_missing_cover_creates_nothing() {
        let src = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        let rom_src = rom(src.path(), "game.gba");

        let req = InstallRequest::new(&rom_src, Device::Gba, public.path())
            .with_cover(src.path().join("missing.png"));

        assert!(matches!(install(&req), Err(InstallError::InvalidInput(_))));
        assert!(!public.path().join("rom").exists());
    }

    #[test]
    fn install_with_bad_cover_still_commits() {
        let src = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        let rom_src = rom(src.path(), "game.gba");
        let cover_src = src.path().join("cover.jpg");
        fs::write(&cover_src, b"not really a jpeg").unwrap();

        let req = InstallRequest::new(&rom_src, Device::Gba, public.path())
            .with_name("Broken Cover")
            .with_cover(&cover_src);
        let outcome = install(&req).unwrap();

        assert!(matches!(outcome.cover, CoverOutcome::Failed { .. }));
        assert!(outcome.rom_path.is_file());
        assert!(outcome.slot_dir.join(CONFIG_FILE).is_file());
        assert!(!outcome.slot_dir.join(COVER_FILE).exists());
    }

    #[test]
    fn installed_games_missing_category() {
        let public = tempfile::tempdir().unwrap();
        assert!(installed_games(public.path(), Device::Ds).unwrap().is_empty());
    }

    #[test]
    fn installed_games_lists_in_slot_order() {
        let src = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();

        for name in ["One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten"] {
            let rom_src = rom(src.path(), "game.gba");
            install(&InstallRequest::new(&rom_src, Device::Gba, public.path()).with_name(name))
                .unwrap();
        }

        let base = slot::device_dir(public.path(), Device::Gba);
        fs::create_dir(base.join("notes")).unwrap();
        fs::write(base.join("README"), "ignored").unwrap();
        fs::create_dir(base.join("0")).unwrap();

        let games = installed_games(public.path(), Device::Gba).unwrap();
        let ids: Vec<u32> = games.iter().map(|g| g.slot_id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(games[9].name.as_deref(), Some("Ten"));
        assert_eq!(games[0].rom_file, Some(base.join("1").join("GBA1.gba")));
        assert!(!games[0].has_cover);
    }

    #[test]
    fn installed_games_tolerates_empty_slot() {
        let public = tempfile::tempdir().unwrap();
        let base = slot::device_dir(public.path(), Device::Ds);
        fs::create_dir_all(base.join("4")).unwrap();

        let games = installed_games(public.path(), Device::Ds).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].slot_id, 4);
        assert_eq!(games[0].name, None);
        assert_eq!(games[0].rom_file, None);
    }

    #[test]
    fn installed_games_ignores_non_canonical_numbers() {
        let src = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        let rom_src = rom(src.path(), "game.gba");
        install(&InstallRequest::new(&rom_src, Device::Gba, public.path()).with_name("Real"))
            .unwrap();

        let base = slot::device_dir(public.path(), Device::Gba);
        fs::create_dir(base.join("01")).unwrap();
        fs::create_dir(base.join("+1")).unwrap();

        let games = installed_games(public.path(), Device::Gba).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].slot_dir, base.join("1"));
        assert_eq!(games[0].name.as_deref(), Some("Real"));
    }
}
