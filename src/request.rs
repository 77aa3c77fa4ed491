//! Playback requests — the single input the tone engine understands.

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// How the carrier is shaped before it reaches the master bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modality {
    /// One sine at the carrier, centered.
    Plain,
    /// Two sines at `carrier ∓ beat_offset / 2`, panned hard left and right.
    Binaural { beat_offset: f64 },
    /// One sine at the carrier, amplitude-modulated at `pulse_frequency`.
    Pulsed { pulse_frequency: f64 },
}

/// An immutable, validated description of what should be sounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RequestRecord", into = "RequestRecord")]
pub struct PlaybackRequest {
    carrier_frequency: f64,
    volume: f64,
    modality: Modality,
}

impl PlaybackRequest {
    pub fn new(
        carrier_frequency: f64,
        volume: f64,
        modality: Modality,
    ) -> Result<Self, RequestError> {
        if !is_positive_hz(carrier_frequency) {
            return Err(RequestError::InvalidCarrier(carrier_frequency));
        }
        if !(0.0..=1.0).contains(&volume) {
            return Err(RequestError::InvalidVolume(volume));
        }
        match modality {
            Modality::Binaural { beat_offset } if !is_positive_hz(beat_offset) => {
                return Err(RequestError::InvalidBeatOffset(beat_offset));
            }
            Modality::Pulsed { pulse_frequency } if !is_positive_hz(pulse_frequency) => {
                return Err(RequestError::InvalidPulseFrequency(pulse_frequency));
            }
            _ => {}
        }
        Ok(PlaybackRequest {
            carrier_frequency,
            volume,
            modality,
        })
    }

    pub fn plain(carrier_frequency: f64, volume: f64) -> Result<Self, RequestError> {
        Self::new(carrier_frequency, volume, Modality::Plain)
    }

    pub fn binaural(
        carrier_frequency: f64,
        volume: f64,
        beat_offset: f64,
    ) -> Result<Self, RequestError> {
        Self::new(carrier_frequency, volume, Modality::Binaural { beat_offset })
    }

    pub fn pulsed(
        carrier_frequency: f64,
        volume: f64,
        pulse_frequency: f64,
    ) -> Result<Self, RequestError> {
        Self::new(carrier_frequency, volume, Modality::Pulsed { pulse_frequency })
    }

    /// Build a request from the two independent optional fields used by
    /// stored protocols. A binaural offset takes precedence over a pulse
    /// frequency when both are present.
    pub fn from_parts(
        carrier_frequency: f64,
        volume: f64,
        binaural_beat_offset: Option<f64>,
        pulse_frequency: Option<f64>,
    ) -> Result<Self, RequestError> {
        let modality = match (binaural_beat_offset, pulse_frequency) {
            (Some(beat_offset), pulse) => {
                if let Some(pulse) = pulse {
                    log::debug!("binaural offset {beat_offset} Hz overrides pulse {pulse} Hz");
                }
                Modality::Binaural { beat_offset }
            }
            (None, Some(pulse_frequency)) => Modality::Pulsed { pulse_frequency },
            (None, None) => Modality::Plain,
        };
        Self::new(carrier_frequency, volume, modality)
    }

    pub fn carrier_frequency(&self) -> f64 {
        self.carrier_frequency
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn binaural_beat_offset(&self) -> Option<f64> {
        match self.modality {
            Modality::Binaural { beat_offset } => Some(beat_offset),
            _ => None,
        }
    }

    pub fn pulse_frequency(&self) -> Option<f64> {
        match self.modality {
            Modality::Pulsed { pulse_frequency } => Some(pulse_frequency),
            _ => None,
        }
    }
}

fn is_positive_hz(hz: f64) -> bool {
    hz.is_finite() && hz > 0.0
}

/// Wire shape of a request as exchanged with the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestRecord {
    carrier_frequency: f64,
    volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    binaural_beat_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pulse_frequency: Option<f64>,
}

impl TryFrom<RequestRecord> for PlaybackRequest {
    type Error = RequestError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        PlaybackRequest::from_parts(
            record.carrier_frequency,
            record.volume,
            record.binaural_beat_offset,
            record.pulse_frequency,
        )
    }
}

impl From<PlaybackRequest> for RequestRecord {
    fn from(request: PlaybackRequest) -> Self {
        RequestRecord {
            carrier_frequency: request.carrier_frequency,
            volume: request.volume,
            binaural_beat_offset: request.binaural_beat_offset(),
            pulse_frequency: request.pulse_frequency(),
        }
    }
}
