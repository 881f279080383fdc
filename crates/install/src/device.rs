use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InstallError;

/// Supported device category. Each one owns an independent slot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    /// Nintendo DS.
    #[serde(rename = "DS")]
    Ds,
    /// Game Boy Advance.
    #[serde(rename = "GBA")]
    Gba,
}

impl Device {
    /// Returns all supported devices.
    pub fn all() -> &'static [Device] {
        &[Device::Ds, Device::Gba]
    }

    /// Returns the on-disk code, used both as directory name and ROM prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Device::Ds => "DS",
            Device::Gba => "GBA",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Device {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Device::all()
            .iter()
            .copied()
            .find(|d| d.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| InstallError::InvalidInput(format!("unsupported device: {code:?}")))
    }
}
