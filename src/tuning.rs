//! Live-editable balance parameters.
//!
//! Everything a designer would want to retune without a rebuild lives here:
//! movement/fire/recoil feel, the vacuum geometry, and the damage multiplier.
//! The struct round-trips through a JSON file so a tweaked build can be
//! reproduced later.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("failed to read or write tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Movement: heavier load slows the player down
    pub move_speed_at_zero_weight: f32,
    pub move_speed_at_max_weight: f32,

    // Vacuum geometry
    pub vacuum_distance: f32,
    pub vacuum_radius: f32,
    pub max_weight: f32,

    // BeingSucked -> Held transition: fraction of the outer arrangement
    // radius, clamped to [min, max]
    pub hold_transition_ratio: f32,
    pub hold_transition_min_radius: f32,
    pub hold_transition_max_radius: f32,

    // Fire: heavier load sprays wider
    pub fire_speed: f32,
    pub fire_spread_min_deg: f32,
    pub fire_spread_max_deg: f32,
    pub shooting_state_duration: f32,

    // Recoil: heavier shots kick harder
    pub recoil_distance_min: f32,
    pub recoil_distance_max: f32,
    pub recoil_acceleration: f32,
    pub recoil_friction: f32,
    pub recoil_angle_min: f32,
    pub recoil_angle_max: f32,
    pub recoil_angle_decay: f32,

    // Scrap damage scale, applied on top of per-weight base damage
    pub damage_multiplier: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            move_speed_at_zero_weight: 300.0,
            move_speed_at_max_weight: 150.0,

            vacuum_distance: 100.0,
            vacuum_radius: 150.0,
            max_weight: 25.0,

            hold_transition_ratio: 0.8,
            hold_transition_min_radius: 5.0,
            hold_transition_max_radius: 30.0,

            fire_speed: 820.0,
            fire_spread_min_deg: 15.0,
            fire_spread_max_deg: 25.0,
            shooting_state_duration: 0.2,

            recoil_distance_min: 50.0,
            recoil_distance_max: 350.0,
            recoil_acceleration: 2000.0,
            recoil_friction: 0.90,
            recoil_angle_min: 0.2,
            recoil_angle_max: 0.785,
            recoil_angle_decay: 8.0,

            damage_multiplier: 1.0,
        }
    }
}

impl Tuning {
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let content = fs::read_to_string(path)?;
        let tuning = serde_json::from_str(&content)?;
        Ok(tuning)
    }

    pub fn save(&self, path: &Path) -> Result<(), TuningError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path`, falling back to defaults on any failure. A missing
    /// or broken tuning file is not fatal, just a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }
}
