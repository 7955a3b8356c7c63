use std::time::Duration;

use crate::config::AudioSettings;
use crate::engine::{AudioEngine, DistanceModel, EngineError, NodeId, NodeSpec, PanningModel};

use super::preset::PresetProfile;

/// Fixed processing nodes, built once per session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChainNodes {
    pub highpass: NodeId,
    pub bass: NodeId,
    pub presence: NodeId,
    pub treble: NodeId,
    pub compressor: NodeId,
    pub panner: NodeId,
    pub trim: NodeId,
}

impl ChainNodes {
    /// Where a bound source gets connected.
    pub fn head(&self) -> NodeId {
        self.highpass
    }

    /// Nodes in signal order.
    pub fn in_order(&self) -> [NodeId; 7] {
        [
            self.highpass,
            self.bass,
            self.presence,
            self.treble,
            self.compressor,
            self.panner,
            self.trim,
        ]
    }
}

pub(super) fn chain_specs(settings: &AudioSettings, tone: &PresetProfile) -> [NodeSpec; 7] {
    [
        NodeSpec::HighPass {
            frequency: settings.highpass_hz,
            q: std::f32::consts::FRAC_1_SQRT_2,
        },
        NodeSpec::LowShelf {
            frequency: settings.bass_hz,
            gain_db: tone.bass,
        },
        NodeSpec::Peaking {
            frequency: settings.presence_hz,
            q: settings.presence_q,
            gain_db: tone.presence,
        },
        NodeSpec::HighShelf {
            frequency: settings.treble_hz,
            gain_db: tone.treble,
        },
        NodeSpec::Compressor {
            threshold_db: settings.compressor_threshold_db,
            knee_db: settings.compressor_knee_db,
            ratio: settings.compressor_ratio,
            attack: Duration::from_millis(settings.compressor_attack_ms),
            release: Duration::from_millis(settings.compressor_release_ms),
        },
        NodeSpec::Panner {
            panning: PanningModel::Hrtf,
            distance: DistanceModel::Inverse,
            ref_distance: settings.panner_ref_distance,
            max_distance: settings.panner_max_distance,
            rolloff: settings.panner_rolloff,
        },
        NodeSpec::Gain {
            value: settings.output_trim,
        },
    ]
}

/// Create every chain node and wire them through to the destination.
pub(super) fn build_chain<E: AudioEngine>(
    engine: &E,
    settings: &AudioSettings,
    tone: &PresetProfile,
) -> Result<ChainNodes, EngineError> {
    let specs = chain_specs(settings, tone);
    let mut ids = [NodeId(0); 7];
    for (slot, spec) in ids.iter_mut().zip(specs.iter()) {
        *slot = engine.create_node(spec)?;
    }

    for pair in ids.windows(2) {
        engine.connect(pair[0], pair[1])?;
    }
    engine.connect(ids[6], engine.destination())?;

    let [highpass, bass, presence, treble, compressor, panner, trim] = ids;
    Ok(ChainNodes {
        highpass,
        bass,
        presence,
        treble,
        compressor,
        panner,
        trim,
    })
}
