//! DSP — the render graph behind the tone engine.
//!
//! Everything here is pure Rust and allocation-free per sample, so the same
//! code serves the browser (AudioWorklet + WASM) and the offline WAV renderer.

pub mod engine;
pub mod graph;
pub mod mixer;
pub mod oscillator;
pub mod panner;
pub mod param;
pub mod renderer;
pub mod sequence;
pub mod voice;
