//! Tone Engine — realizes playback requests as continuous stereo audio.
//!
//! The engine owns the output graph, the sounding voices, the optional pulse
//! modulator and the sequence timer. At most one request sounds at a time:
//! every `play`, sequence advance and `stop` tears down the previous voices
//! before anything new is connected.
//!
//! Time is measured in rendered frames. Hosts pull audio through
//! [`ToneEngine::render`], and the sequence timer fires inside that call at
//! the exact frame its deadline falls on.

use std::time::Duration;

use crate::config::EngineConfig;
use crate::request::{Modality, PlaybackRequest};

use super::graph::OutputGraph;
use super::panner::{LEFT, RIGHT};
use super::sequence::{Sequence, SequenceTimer};
use super::voice::{PulseInfo, PulseModulator, Voice, VoiceInfo};

pub struct ToneEngine {
    config: EngineConfig,
    /// `None` when no output could be acquired; the engine is then a no-op.
    graph: Option<OutputGraph>,
    voices: Vec<Voice>,
    pulse: Option<PulseModulator>,
    current: Option<PlaybackRequest>,
    sequence: Option<Sequence>,
    sequence_timer: Option<SequenceTimer>,
}

impl ToneEngine {
    /// Acquire an output graph for `config`. If that fails the error is
    /// logged and the engine comes up disabled.
    pub fn new(config: EngineConfig) -> Self {
        let graph = match OutputGraph::acquire(&config) {
            Ok(graph) => Some(graph),
            Err(e) => {
                log::error!("audio output unavailable, tone engine disabled: {e}");
                None
            }
        };
        Self::with_graph(config, graph)
    }

    /// An engine with no output. Every operation is a no-op.
    pub fn disabled() -> Self {
        Self::with_graph(EngineConfig::default(), None)
    }

    fn with_graph(config: EngineConfig, graph: Option<OutputGraph>) -> Self {
        ToneEngine {
            config,
            graph,
            voices: Vec::new(),
            pulse: None,
            current: None,
            sequence: None,
            sequence_timer: None,
        }
    }

    // ── Operations ──────────────────────────────────────────────

    /// Replace whatever is sounding with `request`. Cancels any sequence.
    pub fn play(&mut self, request: &PlaybackRequest) {
        if self.graph.is_none() {
            return;
        }
        self.stop();
        self.realize(request);
    }

    /// Loop through `requests`, switching every `step_duration`.
    ///
    /// The first request starts immediately and `on_step` is called with it
    /// before this returns; each later step calls `on_step` as it starts.
    /// An empty list only stops current playback.
    pub fn play_sequence<F>(
        &mut self,
        requests: Vec<PlaybackRequest>,
        on_step: F,
        step_duration: Duration,
    ) where
        F: FnMut(&PlaybackRequest) + 'static,
    {
        let Some(graph) = &self.graph else {
            return;
        };
        let step_frames = graph.ms_to_frames(step_duration.as_secs_f64() * 1000.0);
        self.stop();

        let count = requests.len();
        let Some(sequence) = Sequence::new(requests, step_frames, Box::new(on_step)) else {
            log::debug!("empty sequence, nothing to play");
            return;
        };
        log::debug!(
            "starting sequence of {count} steps, {} frames each",
            sequence.step_frames()
        );
        self.advance_sequence(sequence);
    }

    /// [`play_sequence`](Self::play_sequence) with the configured default step.
    pub fn play_sequence_default<F>(&mut self, requests: Vec<PlaybackRequest>, on_step: F)
    where
        F: FnMut(&PlaybackRequest) + 'static,
    {
        let step = self.config.default_step();
        self.play_sequence(requests, on_step, step);
    }

    /// Cancel any pending sequence step and silence all voices. Idempotent.
    pub fn stop(&mut self) {
        if self.sequence_timer.take().is_some() {
            log::debug!("sequence cancelled");
        }
        self.sequence = None;
        self.release_voices();
    }

    /// Ramp the master volume to `volume` over the configured ramp time.
    /// Values outside [0, 1] are clamped; NaN is ignored.
    pub fn set_volume(&mut self, volume: f64) {
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        if volume.is_nan() {
            log::warn!("ignoring NaN volume");
            return;
        }
        let clamped = volume.clamp(0.0, 1.0);
        if clamped != volume {
            log::warn!("volume {volume} clamped to {clamped}");
        }
        let ramp = graph.ms_to_frames(self.config.volume_ramp_ms) as usize;
        graph.mixer.master_gain.ramp_to(clamped, ramp);
    }

    /// Fill `out` with interleaved stereo frames. A sequence step fires as
    /// soon as the clock reaches its deadline, so the next request sounds
    /// from exactly that frame. A trailing odd sample is zeroed.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.graph.is_none() {
            out.fill(0.0);
            return;
        }
        let mut frames = out.chunks_exact_mut(2);
        for frame in &mut frames {
            let (l, r) = self.next_frame();
            frame[0] = l;
            frame[1] = r;
            self.fire_due_step();
        }
        frames.into_remainder().fill(0.0);
    }

    /// Render `frames` stereo frames into a new buffer.
    pub fn render_frames(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames * 2];
        self.render(&mut out);
        out
    }

    // ── Inspection ──────────────────────────────────────────────

    pub fn is_enabled(&self) -> bool {
        self.graph.is_some()
    }

    pub fn is_playing(&self) -> bool {
        !self.voices.is_empty()
    }

    pub fn is_sequencing(&self) -> bool {
        self.sequence_timer.is_some()
    }

    pub fn active_voices(&self) -> Vec<VoiceInfo> {
        self.voices.iter().map(Voice::info).collect()
    }

    pub fn pulse_modulator(&self) -> Option<PulseInfo> {
        self.pulse.as_ref().map(PulseModulator::info)
    }

    /// The request currently sounding, if any.
    pub fn current_request(&self) -> Option<&PlaybackRequest> {
        self.current.as_ref()
    }

    /// Current master gain, or `None` when disabled.
    pub fn master_volume(&self) -> Option<f64> {
        self.graph.as_ref().map(|g| g.mixer.master_gain.value())
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.graph.as_ref().map(OutputGraph::sample_rate)
    }

    /// Frames rendered so far.
    pub fn elapsed_frames(&self) -> u64 {
        self.graph.as_ref().map_or(0, OutputGraph::frame)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Internals ───────────────────────────────────────────────

    /// Connect the voices for `request`, replacing any current ones.
    /// Leaves the sequence untouched.
    fn realize(&mut self, request: &PlaybackRequest) {
        self.release_voices();
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        graph.mixer.master_gain.set(request.volume());

        let sr = graph.sample_rate();
        let carrier = request.carrier_frequency();
        match request.modality() {
            Modality::Binaural { beat_offset } => {
                let half = beat_offset / 2.0;
                self.voices.push(Voice::panned(carrier - half, LEFT, sr));
                self.voices.push(Voice::panned(carrier + half, RIGHT, sr));
            }
            Modality::Pulsed { pulse_frequency } => {
                self.voices.push(Voice::centered(carrier, sr));
                let depth = self.config.pulse_depth;
                self.pulse = Some(PulseModulator::new(pulse_frequency, depth, sr));
            }
            Modality::Plain => {
                self.voices.push(Voice::centered(carrier, sr));
            }
        }
        self.current = Some(*request);
        log::debug!(
            "playing {carrier} Hz ({:?}) at volume {}",
            request.modality(),
            request.volume()
        );
    }

    /// Stop and drop every voice and the modulator. Generators that were
    /// already stopped are tolerated.
    fn release_voices(&mut self) {
        for mut voice in self.voices.drain(..) {
            if let Err(e) = voice.stop() {
                log::trace!("voice teardown: {e}");
            }
        }
        if let Some(mut pulse) = self.pulse.take() {
            if let Err(e) = pulse.stop() {
                log::trace!("modulator teardown: {e}");
            }
        }
        self.current = None;
    }

    /// Start the sequence's next step, notify, then re-arm the timer.
    fn advance_sequence(&mut self, mut sequence: Sequence) {
        let request = sequence.next_request();
        self.realize(&request);
        sequence.notify(&request);

        let now = self.elapsed_frames();
        self.sequence_timer = Some(SequenceTimer::arm(now, sequence.step_frames()));
        self.sequence = Some(sequence);
    }

    fn fire_due_step(&mut self) {
        let now = self.elapsed_frames();
        if !self.sequence_timer.is_some_and(|t| t.is_due(now)) {
            return;
        }
        self.sequence_timer = None;
        if let Some(sequence) = self.sequence.take() {
            self.advance_sequence(sequence);
        }
    }

    fn next_frame(&mut self) -> (f32, f32) {
        let Some(graph) = self.graph.as_mut() else {
            return (0.0, 0.0);
        };
        let gain = self.pulse.as_mut().map_or(1.0, PulseModulator::next_gain);
        for voice in self.voices.iter_mut() {
            let (l, r) = voice.next_frame();
            graph.mixer.add(l * gain, r * gain);
        }
        graph.take_frame()
    }
}

impl Default for ToneEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Drop for ToneEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ToneEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneEngine")
            .field("enabled", &self.is_enabled())
            .field("voices", &self.active_voices())
            .field("pulse", &self.pulse_modulator())
            .field("current", &self.current)
            .field("sequence_timer", &self.sequence_timer)
            .finish()
    }
}
