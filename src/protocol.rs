//! Protocol records — named presets offered to the listener.
//!
//! These map directly to the records the page persists for user-authored
//! protocols, so field names serialize in camelCase and optional fields are
//! omitted when absent.

use serde::{Deserialize, Serialize};

use crate::error::{DraftError, RequestError};
use crate::request::PlaybackRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Carrier frequencies in Hz. Only the first one is played.
    pub carrier_frequencies: Vec<f64>,
    pub effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binaural_beat_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse_frequency: Option<f64>,
    /// Plays every built-in protocol in turn instead of its own carriers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sequence: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_custom: Option<bool>,
}

impl Protocol {
    pub fn is_sequence(&self) -> bool {
        self.is_sequence.unwrap_or(false)
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom.unwrap_or(false)
    }

    /// The request this protocol plays at `volume`, or `None` when it has
    /// no carrier.
    pub fn request(&self, volume: f64) -> Option<Result<PlaybackRequest, RequestError>> {
        let carrier = *self.carrier_frequencies.first()?;
        Some(PlaybackRequest::from_parts(
            carrier,
            volume,
            self.binaural_beat_offset,
            self.pulse_frequency,
        ))
    }
}

// ── Built-in catalog ────────────────────────────────────────

fn builtin(
    id: &str,
    name: &str,
    description: &str,
    carrier_frequencies: &[f64],
    effects: &[&str],
) -> Protocol {
    Protocol {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        carrier_frequencies: carrier_frequencies.to_vec(),
        effects: effects.iter().map(|e| e.to_string()).collect(),
        binaural_beat_offset: None,
        pulse_frequency: None,
        is_sequence: None,
        is_custom: None,
    }
}

/// The stock protocols, in display order.
pub fn builtin_protocols() -> Vec<Protocol> {
    vec![
        builtin(
            "cellular-regeneration",
            "Cellular Regeneration",
            "A pure tone designed to trigger stem cell differentiation, telomere lengthening, \
             and mitochondrial biogenesis.",
            &[528.0],
            &["DNA Repair", "Youthful Expression", "Mitochondrial Health"],
        ),
        builtin(
            "trauma-release",
            "Trauma Release",
            "Releases cellular memory of trauma and rewrites emotional patterns for liberation.",
            &[396.0],
            &["Emotional Reset", "Cellular Memory Erasure", "Inner Peace"],
        ),
        builtin(
            "spiritual-awakening",
            "Spiritual Awakening",
            "Activates latent DNA, enhances psychic abilities, and connects to cosmic \
             consciousness.",
            &[963.0],
            &["Pineal Activation", "Higher Self Integration", "Cosmic Connection"],
        ),
        Protocol {
            binaural_beat_offset: Some(3.4),
            ..builtin(
                "deep-delta-sleep",
                "Deep Delta Sleep",
                "Guides the brain into the deepest states of sleep using binaural beats for \
                 physical and mental restoration.",
                &[100.0],
                &["Restorative Sleep", "Brainwave Entrainment", "Mental Clarity"],
            )
        },
        Protocol {
            pulse_frequency: Some(7.83),
            ..builtin(
                "schumann-resonance",
                "Schumann Resonance",
                "Grounds your biofield with the Earth's natural frequency, pulsed for a PEMF-like \
                 effect promoting balance.",
                &[120.0],
                &["Grounding", "Stress Reduction", "Biofield Coherence", "PEMF"],
            )
        },
        Protocol {
            binaural_beat_offset: Some(10.0),
            ..builtin(
                "focused-alpha-state",
                "Focused Alpha State",
                "Utilizes binaural beats to entrain the brain to an alpha wave state, ideal for \
                 calm focus and light meditation.",
                &[140.0],
                &["Enhanced Focus", "Calm Awareness", "Creativity Boost"],
            )
        },
        Protocol {
            is_sequence: Some(true),
            ..builtin(
                "unified-field-resonance",
                "Unified Field Resonance",
                "A full-spectrum sequence that cycles through all Omega protocols, creating a \
                 holistic resonance for complete mind-body-spirit harmonization.",
                &[],
                &[
                    "Full Body Attunement",
                    "Biofield Integration",
                    "Holistic Healing",
                    "Synergy",
                ],
            )
        },
    ]
}

/// Requests for every built-in protocol a sequence protocol plays: the
/// non-sequence ones that have a carrier, in catalog order.
pub fn sequence_requests(volume: f64) -> Result<Vec<PlaybackRequest>, RequestError> {
    builtin_protocols()
        .iter()
        .filter(|p| !p.is_sequence())
        .filter_map(|p| p.request(volume))
        .collect()
}

// ── Authoring ───────────────────────────────────────────────

/// Carrier range offered when authoring a protocol, in Hz.
pub const CARRIER_RANGE: std::ops::RangeInclusive<f64> = 30.0..=1000.0;
/// Binaural offset and pulse range offered when authoring, in Hz.
pub const MODULATION_RANGE: std::ops::RangeInclusive<f64> = 0.1..=30.0;

/// Modulation choice in the authoring form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "frequency", rename_all = "lowercase")]
pub enum DraftModality {
    None,
    Binaural(f64),
    Pulse(f64),
}

/// A user-authored protocol before it is given an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProtocolDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Comma-separated list of effects.
    #[serde(default)]
    pub effects: String,
    pub carrier_frequency: f64,
    pub modality: DraftModality,
}

impl CustomProtocolDraft {
    /// Validate the draft and turn it into a custom protocol whose id is
    /// derived from `created_at_ms` (milliseconds since the Unix epoch).
    pub fn build(&self, created_at_ms: u128) -> Result<Protocol, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }
        if !CARRIER_RANGE.contains(&self.carrier_frequency) {
            return Err(DraftError::CarrierOutOfRange(self.carrier_frequency));
        }
        let (binaural_beat_offset, pulse_frequency) = match self.modality {
            DraftModality::None => (None, None),
            DraftModality::Binaural(hz) => (Some(check_modulation(hz)?), None),
            DraftModality::Pulse(hz) => (None, Some(check_modulation(hz)?)),
        };

        Ok(Protocol {
            id: format!("custom-{created_at_ms}"),
            name: name.to_string(),
            description: self.description.trim().to_string(),
            carrier_frequencies: vec![self.carrier_frequency],
            effects: split_effects(&self.effects),
            binaural_beat_offset,
            pulse_frequency,
            is_sequence: None,
            is_custom: Some(true),
        })
    }
}

fn check_modulation(hz: f64) -> Result<f64, DraftError> {
    if MODULATION_RANGE.contains(&hz) {
        Ok(hz)
    } else {
        Err(DraftError::ModulationOutOfRange(hz))
    }
}

fn split_effects(effects: &str) -> Vec<String> {
    effects
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Modality;

    #[test]
    fn catalog_has_seven_protocols_with_unique_ids() {
        let all = builtin_protocols();
        assert_eq!(all.len(), 7);
        let mut ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn protocol_requests_carry_modality() {
        let all = builtin_protocols();
        let delta = all.iter().find(|p| p.id == "deep-delta-sleep").unwrap();
        let req = delta.request(0.5).unwrap().unwrap();
        assert_eq!(req.modality(), Modality::Binaural { beat_offset: 3.4 });

        let schumann = all.iter().find(|p| p.id == "schumann-resonance").unwrap();
        let req = schumann.request(0.5).unwrap().unwrap();
        let pulsed = Modality::Pulsed {
            pulse_frequency: 7.83,
        };
        assert_eq!(req.modality(), pulsed);
    }

    #[test]
    fn builtin_descriptions_match_catalog_text() {
        let all = builtin_protocols();
        assert_eq!(
            all[0].description,
            "A pure tone designed to trigger stem cell differentiation, telomere lengthening, \
             and mitochondrial biogenesis."
        );
        assert_eq!(
            all[4].description,
            "Grounds your biofield with the Earth's natural frequency, pulsed for a PEMF-like \
             effect promoting balance."
        );
    }

    #[test]
    fn sequence_protocol_has_no_request() {
        let all = builtin_protocols();
        let unified = all.iter().find(|p| p.is_sequence()).unwrap();
        assert!(unified.request(0.5).is_none());
    }

    #[test]
    fn sequence_requests_cover_playable_builtins_in_order() {
        let reqs = sequence_requests(0.5).unwrap();
        let hz: Vec<f64> = reqs.iter().map(|r| r.carrier_frequency()).collect();
        assert_eq!(hz, vec![528.0, 396.0, 963.0, 100.0, 120.0, 140.0]);
        assert!(reqs.iter().all(|r| r.volume() == 0.5));
    }

    #[test]
    fn record_serializes_in_camel_case_without_absent_fields() {
        let all = builtin_protocols();
        let json = serde_json::to_value(&all[3]).unwrap();
        assert_eq!(json["carrierFrequencies"], serde_json::json!([100.0]));
        assert_eq!(json["binauralBeatOffset"], serde_json::json!(3.4));
        assert!(json.get("pulseFrequency").is_none());
        assert!(json.get("isCustom").is_none());
    }

    #[test]
    fn draft_builds_custom_protocol() {
        let draft = CustomProtocolDraft {
            name: "  Nova's Frequency ".into(),
            description: "Evening wind-down".into(),
            effects: "Clarity, , Vitality ,".into(),
            carrier_frequency: 120.0,
            modality: DraftModality::Binaural(10.0),
        };
        let p = draft.build(1_700_000_000_000).unwrap();
        assert_eq!(p.id, "custom-1700000000000");
        assert_eq!(p.name, "Nova's Frequency");
        assert_eq!(p.effects, vec!["Clarity", "Vitality"]);
        assert_eq!(p.binaural_beat_offset, Some(10.0));
        assert_eq!(p.pulse_frequency, None);
        assert!(p.is_custom());
    }

    #[test]
    fn draft_validation() {
        let base = CustomProtocolDraft {
            name: "X".into(),
            description: String::new(),
            effects: String::new(),
            carrier_frequency: 120.0,
            modality: DraftModality::None,
        };
        let blank = CustomProtocolDraft {
            name: "   ".into(),
            ..base.clone()
        };
        assert_eq!(blank.build(0), Err(DraftError::EmptyName));

        let low = CustomProtocolDraft {
            carrier_frequency: 20.0,
            ..base.clone()
        };
        assert_eq!(low.build(0), Err(DraftError::CarrierOutOfRange(20.0)));

        let fast = CustomProtocolDraft {
            modality: DraftModality::Pulse(40.0),
            ..base
        };
        assert_eq!(fast.build(0), Err(DraftError::ModulationOutOfRange(40.0)));
    }
}
