//! Slot allocation under `<public>/rom/<DEVICE>/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Device, InstallError, ROM_DIR};

/// How many candidate slots a single install tries before giving up.
pub const MAX_SLOT_CLAIM_ATTEMPTS: u32 = 8;

/// Returns the directory holding all slots of a device category.
pub fn device_dir(destination_root: &Path, device: Device) -> PathBuf {
    destination_root.join(ROM_DIR).join(device.code())
}

/// Returns the smallest slot id that does not name a directory under `base`.
pub fn next_free_slot(base: &Path) -> u32 {
    next_free_slot_from(base, 1)
}

fn next_free_slot_from(base: &Path, start: u32) -> u32 {
    let mut slot_id = start;
    while base.join(slot_id.to_string()).is_dir() {
        slot_id += 1;
    }
    slot_id
}

/// Creates the next free slot directory under `base` and returns its id and path.
///
/// The slot itself is created non-recursively so a directory that appeared
/// after the scan is reported as taken rather than silently shared. A taken
/// slot moves the search on to the next candidate. Only directories that
/// appeared concurrently count against [`MAX_SLOT_CLAIM_ATTEMPTS`]; a plain
/// file squatting on a slot name is skipped.
pub fn claim_slot(base: &Path) -> Result<(u32, PathBuf), InstallError> {
    claim_slot_with(base, |path| fs::create_dir(path))
}

fn claim_slot_with(
    base: &Path,
    mut create: impl FnMut(&Path) -> io::Result<()>,
) -> Result<(u32, PathBuf), InstallError> {
    fs::create_dir_all(base).map_err(|e| InstallError::io(base, e))?;

    let mut slot_id = next_free_slot(base);
    let mut races = 0;
    while races < MAX_SLOT_CLAIM_ATTEMPTS {
        let path = base.join(slot_id.to_string());
        match create_slot_dir(&path, &mut create) {
            Ok(()) => {
                tracing::debug!(slot_id, path = %path.display(), "claimed slot");
                return Ok((slot_id, path));
            }
            Err(InstallError::SlotAllocationRace { path }) => {
                if path.is_dir() {
                    races += 1;
                    tracing::warn!(slot_id, path = %path.display(), "slot taken, trying next");
                } else {
                    tracing::debug!(
                        slot_id,
                        path = %path.display(),
                        "slot name blocked by a file"
                    );
                }
                slot_id = next_free_slot_from(base, slot_id + 1);
            }
            Err(e) => return Err(e),
        }
    }

    Err(InstallError::io(
        base,
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free slot after {MAX_SLOT_CLAIM_ATTEMPTS} attempts"),
        ),
    ))
}

fn create_slot_dir(
    path: &Path,
    create: &mut impl FnMut(&Path) -> io::Result<()>,
) -> Result<(), InstallError> {
    match create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(InstallError::SlotAllocationRace {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(InstallError::io(path, e)),
    }
}
