//! Player presentation preferences
//!
//! Persisted separately from the records. None of these touch gameplay.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Storage key for settings
pub const SETTINGS_KEY: &str = "gate_glider_settings";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Full-screen flash when a token is collected
    pub pickup_flash: bool,
    /// Flashing gates while the Flash token is active
    pub gate_flashing: bool,
    /// Player trail
    pub trails: bool,

    // === Accessibility ===
    /// Reduced motion (suppresses flashes)
    pub reduced_motion: bool,
    /// High contrast mode (always use the alternate palette)
    pub high_contrast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pickup_flash: true,
            gate_flashing: true,
            trails: true,
            reduced_motion: false,
            high_contrast: false,
        }
    }
}

impl Settings {
    /// Effective pickup flash (respects reduced_motion)
    pub fn effective_pickup_flash(&self) -> bool {
        self.pickup_flash && !self.reduced_motion
    }

    /// Effective gate flashing (respects reduced_motion)
    pub fn effective_flashing(&self) -> bool {
        self.gate_flashing && !self.reduced_motion
    }

    /// Load settings, falling back to defaults when absent or malformed
    pub fn load(storage: &impl Storage) -> Self {
        let Some(json) = storage.read(SETTINGS_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(err) => {
                log::warn!("Ignoring malformed settings: {}", err);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged and ignored
    pub fn save(&self, storage: &mut impl Storage) {
        match serde_json::to_string(self) {
            Ok(json) => match storage.write(SETTINGS_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(err) => log::warn!("Could not save settings: {}", err),
            },
            Err(err) => log::warn!("Could not encode settings: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_reduced_motion_overrides_flashes() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_pickup_flash());
        assert!(!settings.effective_flashing());
        assert!(Settings::default().effective_pickup_flash());
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::new();
        let settings = Settings {
            trails: false,
            high_contrast: true,
            ..Default::default()
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_and_malformed_settings() {
        let storage = MemoryStorage::new().with_value(SETTINGS_KEY, r#"{"trails":false}"#);
        let settings = Settings::load(&storage);
        assert!(!settings.trails);
        assert!(settings.pickup_flash);

        let storage = MemoryStorage::new().with_value(SETTINGS_KEY, "{oops");
        assert_eq!(Settings::load(&storage), Settings::default());
    }
}
