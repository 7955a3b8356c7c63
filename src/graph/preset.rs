use serde::{Deserialize, Serialize};

/// Gains (dB) for the three tone controls.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetProfile {
    pub bass: f32,
    pub presence: f32,
    pub treble: f32,
}

/// Names of the profiles that exist without any configuration.
pub const BUILTIN_PRESETS: [&str; 3] = ["balanced", "vocal", "bass"];

impl PresetProfile {
    pub const fn new(bass: f32, presence: f32, treble: f32) -> Self {
        Self {
            bass,
            presence,
            treble,
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::new(3.0, 1.5, 2.0)),
            "vocal" => Some(Self::new(-1.0, 4.0, 2.5)),
            "bass" => Some(Self::new(6.0, 0.0, 1.0)),
            _ => None,
        }
    }
}
