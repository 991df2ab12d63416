// World-scoped configuration, read at capacity-computation time.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::host::SettingsSource;

// Define a structure to hold world settings with serialization and deserialization capabilities.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSettings {
    /// Alternative charges mode: max charges come from the spell-point budget
    /// and long rests regenerate instead of fully refilling.
    pub alternative_charges: bool,
    /// Constant offset in attack-bonus formulas. Early deployments used 2,
    /// later ones 8; configurable rather than hardcoded.
    pub attack_bonus_offset: i32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        WorldSettings {
            alternative_charges: false, // Standard capacity tables by default.
            attack_bonus_offset: 2,
        }
    }
}

// Additional implementation block for WorldSettings.
impl WorldSettings {
    // Load settings from a specified file path.
    pub fn load_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?; // Read settings from file.
        let settings = serde_json::from_str(&data)?; // Deserialize JSON data into settings.
        Ok(settings)
    }

    // Save current settings to a specified file path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let data = serde_json::to_string_pretty(self)?; // Serialize settings into pretty JSON format.
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?; // Create or overwrite the file.
        file.write_all(data.as_bytes())?; // Write the serialized data to the file.
        Ok(())
    }
}

/// Fixed settings source for hosts that read configuration once at startup
/// and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSettings(pub WorldSettings);

impl SettingsSource for StaticSettings {
    fn world(&self) -> WorldSettings {
        self.0
    }
}
