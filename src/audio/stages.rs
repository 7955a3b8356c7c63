//! Pipeline stages with parameters that can change mid-stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use biquad::{Biquad, Coefficients, DirectForm2Transposed, Q_BUTTERWORTH_F32, ToHertz, Type};
use rodio::Source;
use rodio::source::{LimitSettings, SeekError, Spatial};

use crate::engine::NodeSpec;

/// How often live parameters are re-read by stages that poll.
const PARAM_POLL: Duration = Duration::from_millis(10);

const LEFT_EAR: [f32; 3] = [-0.1, 0.0, 0.0];
const RIGHT_EAR: [f32; 3] = [0.1, 0.0, 0.0];

pub(super) type BoxedSource = Box<dyn Source + Send>;

/// An `f32` shared between the control side and the audio thread.
#[derive(Debug, Clone, Default)]
pub(super) struct SharedF32(Arc<AtomicU32>);

impl SharedF32 {
    pub(super) fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    pub(super) fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(super) fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Live parameters of one node.
#[derive(Debug, Clone, Default)]
pub(super) struct NodeParams {
    pub(super) gain: SharedF32,
    pub(super) position: [SharedF32; 3],
}

impl NodeParams {
    pub(super) fn for_spec(spec: &NodeSpec) -> Self {
        let gain = match spec {
            NodeSpec::LowShelf { gain_db, .. }
            | NodeSpec::Peaking { gain_db, .. }
            | NodeSpec::HighShelf { gain_db, .. } => *gain_db,
            NodeSpec::Gain { value } => *value,
            _ => 0.0,
        };
        Self {
            gain: SharedF32::new(gain),
            position: Default::default(),
        }
    }

    fn emitter(&self) -> [f32; 3] {
        [
            self.position[0].get(),
            self.position[1].get(),
            self.position[2].get(),
        ]
    }
}

/// One processing node, as seen by the pipeline builder.
#[derive(Debug, Clone)]
pub(super) struct StagePlan {
    pub(super) spec: NodeSpec,
    pub(super) params: NodeParams,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum ToneKind {
    LowShelf,
    Peaking,
    HighShelf,
}

const UNITY: Coefficients<f32> = Coefficients {
    a1: 0.0,
    a2: 0.0,
    b0: 1.0,
    b1: 0.0,
    b2: 0.0,
};

fn tone_coefficients(
    kind: ToneKind,
    sample_rate: u32,
    frequency: f32,
    q: f32,
    gain_db: f32,
) -> Coefficients<f32> {
    let fs = sample_rate as f32;
    let f0 = frequency.clamp(20.0, (fs / 2.0 - 1.0).max(20.0));
    let filter = match kind {
        ToneKind::LowShelf => Type::LowShelf(gain_db),
        ToneKind::Peaking => Type::PeakingEQ(gain_db),
        ToneKind::HighShelf => Type::HighShelf(gain_db),
    };
    Coefficients::<f32>::from_params(filter, fs.hz(), f0.hz(), q.max(0.1)).unwrap_or(UNITY)
}

/// Shelf or bell filter whose gain follows a [`SharedF32`].
pub(super) struct ToneStage<S> {
    input: S,
    kind: ToneKind,
    frequency: f32,
    q: f32,
    gain: SharedF32,
    applied_gain: f32,
    applied_rate: u32,
    filters: Vec<DirectForm2Transposed<f32>>,
    channel: usize,
}

impl<S> ToneStage<S>
where
    S: Source,
{
    pub(super) fn new(input: S, kind: ToneKind, frequency: f32, q: f32, gain: SharedF32) -> Self {
        let applied_gain = gain.get();
        let applied_rate = input.sample_rate();
        let coeffs = tone_coefficients(kind, applied_rate, frequency, q, applied_gain);
        let filters = (0..input.channels().max(1))
            .map(|_| DirectForm2Transposed::<f32>::new(coeffs))
            .collect();
        Self {
            input,
            kind,
            frequency,
            q,
            gain,
            applied_gain,
            applied_rate,
            filters,
            channel: 0,
        }
    }

    /// Pick up gain, rate or layout changes at a frame boundary.
    fn refresh(&mut self) {
        let gain = self.gain.get();
        let rate = self.input.sample_rate();
        let channels = usize::from(self.input.channels().max(1));
        if gain == self.applied_gain && rate == self.applied_rate && channels == self.filters.len() {
            return;
        }
        let coeffs = tone_coefficients(self.kind, rate, self.frequency, self.q, gain);
        self.filters
            .resize_with(channels, || DirectForm2Transposed::<f32>::new(coeffs));
        for f in &mut self.filters {
            f.update_coefficients(coeffs);
        }
        self.applied_gain = gain;
        self.applied_rate = rate;
    }
}

impl<S> Iterator for ToneStage<S>
where
    S: Source,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.channel == 0 {
            self.refresh();
        }
        let sample = self.input.next()?;
        let out = self.filters[self.channel].run(sample);
        self.channel = (self.channel + 1) % self.filters.len();
        Some(out)
    }
}

impl<S> Source for ToneStage<S>
where
    S: Source,
{
    fn current_span_len(&self) -> Option<usize> {
        self.input.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.input.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.input.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.input.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.channel = 0;
        self.input.try_seek(pos)
    }
}

/// Wrap `source` in one stage per node, in routing order.
pub(super) fn build_pipeline(source: BoxedSource, plan: &[StagePlan]) -> BoxedSource {
    plan.iter().fold(source, |source, stage| apply_stage(source, stage))
}

fn apply_stage(source: BoxedSource, stage: &StagePlan) -> BoxedSource {
    let params = &stage.params;
    match &stage.spec {
        NodeSpec::HighPass { frequency, q } => {
            Box::new(source.high_pass_with_q(frequency.round().max(1.0) as u32, *q))
        }
        NodeSpec::LowShelf { frequency, .. } => Box::new(ToneStage::new(
            source,
            ToneKind::LowShelf,
            *frequency,
            Q_BUTTERWORTH_F32,
            params.gain.clone(),
        )),
        NodeSpec::Peaking { frequency, q, .. } => Box::new(ToneStage::new(
            source,
            ToneKind::Peaking,
            *frequency,
            *q,
            params.gain.clone(),
        )),
        NodeSpec::HighShelf { frequency, .. } => Box::new(ToneStage::new(
            source,
            ToneKind::HighShelf,
            *frequency,
            Q_BUTTERWORTH_F32,
            params.gain.clone(),
        )),
        NodeSpec::Compressor {
            threshold_db,
            knee_db,
            attack,
            release,
            ..
        } => Box::new(
            source.limit(
                LimitSettings::default()
                    .with_threshold(*threshold_db)
                    .with_knee_width(*knee_db)
                    .with_attack(*attack)
                    .with_release(*release),
            ),
        ),
        NodeSpec::Panner { .. } => {
            let params = params.clone();
            Box::new(
                Spatial::new(source, params.emitter(), LEFT_EAR, RIGHT_EAR).periodic_access(
                    PARAM_POLL,
                    move |spatial| spatial.set_positions(params.emitter(), LEFT_EAR, RIGHT_EAR),
                ),
            )
        }
        NodeSpec::Gain { .. } => {
            let gain = params.gain.clone();
            Box::new(
                source
                    .amplify(gain.get())
                    .periodic_access(PARAM_POLL, move |amp| amp.set_factor(gain.get())),
            )
        }
    }
}
