pub mod config;
pub mod dsp;
pub mod error;
pub mod protocol;
pub mod request;
pub mod store;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;

pub use crate::config::EngineConfig;
pub use crate::dsp::engine::ToneEngine;
pub use crate::error::OmegaError;
pub use crate::protocol::{CustomProtocolDraft, DraftModality, Protocol};
pub use crate::request::{Modality, PlaybackRequest};
pub use crate::store::{ProtocolLibrary, ProtocolStore};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Start `protocol` on `engine` at `volume`.
///
/// A sequence protocol loops through every playable built-in protocol,
/// switching every `step` and reporting each step to `on_step`. Any other
/// protocol plays its first carrier.
pub fn play_protocol<F>(
    engine: &mut ToneEngine,
    protocol: &Protocol,
    volume: f64,
    on_step: F,
    step: Duration,
) -> Result<(), OmegaError>
where
    F: FnMut(&PlaybackRequest) + 'static,
{
    if protocol.is_sequence() {
        let requests = protocol::sequence_requests(volume)?;
        engine.play_sequence(requests, on_step, step);
        return Ok(());
    }
    let request = protocol
        .request(volume)
        .ok_or_else(|| OmegaError::NoCarrier(protocol.id.clone()))??;
    engine.play(&request);
    Ok(())
}

/// Render `seconds` of `protocol` to WAV bytes with a fresh engine.
pub fn render_protocol(
    protocol: &Protocol,
    config: EngineConfig,
    seconds: f64,
    volume: f64,
    step: Duration,
) -> Result<Vec<u8>, OmegaError> {
    let mut engine = ToneEngine::new(config);
    play_protocol(&mut engine, protocol, volume, |_: &PlaybackRequest| {}, step)?;
    Ok(dsp::renderer::render_wav_seconds(&mut engine, seconds)?)
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn step_duration(step_ms: Option<f64>, default: Duration) -> Result<Duration, JsValue> {
    match step_ms {
        None => Ok(default),
        Some(ms) => Duration::try_from_secs_f64(ms / 1000.0).map_err(js_err),
    }
}

/// WASM-exposed: return the crate version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the built-in protocol catalog as an array of records.
#[wasm_bindgen(js_name = builtinProtocols)]
pub fn builtin_protocols_js() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&protocol::builtin_protocols()).map_err(js_err)
}

/// WASM-exposed: render a built-in protocol to a 16-bit stereo WAV byte array.
#[wasm_bindgen(js_name = renderProtocolWav)]
pub fn render_protocol_wav(
    protocol_id: &str,
    seconds: f64,
    sample_rate: f64,
    volume: f64,
) -> Result<Vec<u8>, JsValue> {
    let library = ProtocolLibrary::default();
    let protocol = library
        .find(protocol_id)
        .ok_or_else(|| js_err(OmegaError::UnknownProtocol(protocol_id.to_string())))?;
    let config = EngineConfig::with_sample_rate(sample_rate);
    let step = config.default_step();
    render_protocol(protocol, config, seconds, volume, step).map_err(js_err)
}

/// WASM-exposed tone engine, driven from an AudioWorklet.
///
/// `process` pulls interleaved stereo samples; `takeSteps` drains the
/// sequence steps that started since the previous call so the page can
/// keep its visualization in lockstep.
#[wasm_bindgen]
pub struct WebToneEngine {
    engine: ToneEngine,
    steps: Rc<RefCell<Vec<PlaybackRequest>>>,
}

#[wasm_bindgen]
impl WebToneEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> WebToneEngine {
        WebToneEngine {
            engine: ToneEngine::new(EngineConfig::with_sample_rate(sample_rate)),
            steps: Rc::new(RefCell::new(Vec::new())),
        }
    }

    #[wasm_bindgen(js_name = isEnabled)]
    pub fn is_enabled(&self) -> bool {
        self.engine.is_enabled()
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// `request` is `{carrierFrequency, volume, binauralBeatOffset?, pulseFrequency?}`.
    pub fn play(&mut self, request: JsValue) -> Result<(), JsValue> {
        let request: PlaybackRequest = serde_wasm_bindgen::from_value(request).map_err(js_err)?;
        self.play_request(&request);
        Ok(())
    }

    #[wasm_bindgen(js_name = playSequence)]
    pub fn play_sequence(
        &mut self,
        requests: JsValue,
        step_ms: Option<f64>,
    ) -> Result<(), JsValue> {
        let requests: Vec<PlaybackRequest> =
            serde_wasm_bindgen::from_value(requests).map_err(js_err)?;
        let step = step_duration(step_ms, self.engine.config().default_step())?;
        self.play_requests(requests, step);
        Ok(())
    }

    /// Stop playback. Steps not yet taken are discarded.
    pub fn stop(&mut self) {
        self.steps.borrow_mut().clear();
        self.engine.stop();
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, volume: f64) {
        self.engine.set_volume(volume);
    }

    /// Fill `out` with interleaved stereo samples.
    pub fn process(&mut self, out: &mut [f32]) {
        self.engine.render(out);
    }

    #[wasm_bindgen(js_name = takeSteps)]
    pub fn take_steps(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.drain_steps()).map_err(js_err)
    }
}

impl WebToneEngine {
    /// Play one request, discarding steps left over from a previous sequence.
    pub fn play_request(&mut self, request: &PlaybackRequest) {
        self.steps.borrow_mut().clear();
        self.engine.play(request);
    }

    /// Start a sequence whose steps queue up for [`drain_steps`](Self::drain_steps).
    pub fn play_requests(&mut self, requests: Vec<PlaybackRequest>, step: Duration) {
        self.steps.borrow_mut().clear();
        let sink = Rc::clone(&self.steps);
        let on_step = move |r: &PlaybackRequest| sink.borrow_mut().push(*r);
        self.engine.play_sequence(requests, on_step, step);
    }

    /// Steps started since the previous drain, oldest first.
    pub fn drain_steps(&mut self) -> Vec<PlaybackRequest> {
        std::mem::take(&mut *self.steps.borrow_mut())
    }
}
