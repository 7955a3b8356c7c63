use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::PresetProfile;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/eightd/config.toml` or `~/.config/eightd/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `EIGHTD__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub orbit: OrbitSettings,
    pub presets: PresetSettings,
    pub metadata: MetadataSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub logging: LoggingSettings,
}

/// Constants of the fixed processing chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Rumble filter cutoff (Hz).
    pub highpass_hz: f32,
    /// Low-shelf corner for the bass control (Hz).
    pub bass_hz: f32,
    /// Centre of the presence bell (Hz).
    pub presence_hz: f32,
    pub presence_q: f32,
    /// High-shelf corner for the treble control (Hz).
    pub treble_hz: f32,
    pub compressor_threshold_db: f32,
    pub compressor_knee_db: f32,
    pub compressor_ratio: f32,
    pub compressor_attack_ms: u64,
    pub compressor_release_ms: u64,
    /// Linear gain applied just before the destination.
    pub output_trim: f32,
    pub panner_ref_distance: f32,
    pub panner_max_distance: f32,
    pub panner_rolloff: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            highpass_hz: 60.0,
            bass_hz: 150.0,
            presence_hz: 2500.0,
            presence_q: 1.2,
            treble_hz: 4000.0,
            compressor_threshold_db: -18.0,
            compressor_knee_db: 24.0,
            compressor_ratio: 3.0,
            compressor_attack_ms: 5,
            compressor_release_ms: 250,
            output_trim: 0.95,
            panner_ref_distance: 1.0,
            panner_max_distance: 10_000.0,
            panner_rolloff: 1.0,
        }
    }
}

/// Shape and pace of the simulated rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub radius_x: f32,
    pub radius_z: f32,
    /// Angular speed in radians per second.
    pub speed: f32,
    /// Position update period (milliseconds).
    pub tick_ms: u64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            radius_x: 1.2,
            radius_z: 1.2,
            speed: 1.2,
            tick_ms: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetSettings {
    /// Profile applied when the graph is first built.
    pub default: String,
    /// Extra or overriding profiles, keyed by name.
    ///
    /// Example: `[presets.profiles.night] bass = 2.0, presence = 0.0, treble = -3.0`
    pub profiles: BTreeMap<String, PresetProfile>,
}

impl Default for PresetSettings {
    fn default() -> Self {
        Self {
            default: "balanced".to_string(),
            profiles: BTreeMap::new(),
        }
    }
}

impl PresetSettings {
    /// Look up a profile, preferring configured ones over the built-ins.
    pub fn resolve(&self, name: &str) -> Option<PresetProfile> {
        self.profiles
            .get(name)
            .copied()
            .or_else(|| PresetProfile::builtin(name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub enabled: bool,
    /// API credential for the search endpoint. Lookups are skipped without one.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: "https://www.googleapis.com/youtube/v3/search".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when expanding directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ 8D audio ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Fraction of the track skipped by `h` / `l`.
    pub seek_step: f64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { seek_step: 0.05 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file. Nothing is logged when unset; stderr belongs to the UI.
    pub file: Option<PathBuf>,
    /// `tracing` filter directive. `EIGHTD_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}
