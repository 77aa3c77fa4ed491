//! Persistence and lookup for user-authored protocols.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OmegaError, StoreError};
use crate::protocol::{Protocol, builtin_protocols};

/// Namespaced key the custom protocol list is stored under.
pub const STORE_KEY: &str = "omega_custom_protocols";

/// A JSON file holding the custom protocol list.
#[derive(Debug, Clone)]
pub struct ProtocolStore {
    path: PathBuf,
}

impl ProtocolStore {
    /// Store living at `<dir>/omega_custom_protocols.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        ProtocolStore {
            path: dir.as_ref().join(format!("{STORE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rehydrate the stored list. A missing file is an empty list.
    pub fn load(&self) -> Result<Vec<Protocol>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no protocol store at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&json).map_err(|source| StoreError::Format {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Replace the stored list, creating the parent directory if needed.
    pub fn save(&self, protocols: &[Protocol]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let json = serde_json::to_string_pretty(protocols).map_err(|source| StoreError::Format {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| self.io_error(source))?;
        log::debug!("saved {} custom protocols to {}", protocols.len(), self.path.display());
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Built-in protocols followed by the user's custom ones.
#[derive(Debug, Clone)]
pub struct ProtocolLibrary {
    builtin: Vec<Protocol>,
    custom: Vec<Protocol>,
}

impl ProtocolLibrary {
    pub fn new(custom: Vec<Protocol>) -> Self {
        ProtocolLibrary {
            builtin: builtin_protocols(),
            custom,
        }
    }

    pub fn load(store: &ProtocolStore) -> Result<Self, StoreError> {
        Ok(Self::new(store.load()?))
    }

    pub fn save(&self, store: &ProtocolStore) -> Result<(), StoreError> {
        store.save(&self.custom)
    }

    pub fn all(&self) -> impl Iterator<Item = &Protocol> {
        self.builtin.iter().chain(self.custom.iter())
    }

    pub fn custom(&self) -> &[Protocol] {
        &self.custom
    }

    pub fn find(&self, id: &str) -> Option<&Protocol> {
        self.all().find(|p| p.id == id)
    }

    /// Append a custom protocol. The record is marked custom.
    pub fn add_custom(&mut self, mut protocol: Protocol) {
        protocol.is_custom = Some(true);
        self.custom.push(protocol);
    }

    /// Remove a custom protocol by id and return it. Built-ins cannot be removed.
    pub fn remove_custom(&mut self, id: &str) -> Result<Protocol, OmegaError> {
        if let Some(pos) = self.custom.iter().position(|p| p.id == id) {
            return Ok(self.custom.remove(pos));
        }
        if self.builtin.iter().any(|p| p.id == id) {
            return Err(OmegaError::BuiltinProtocol(id.to_string()));
        }
        Err(OmegaError::UnknownProtocol(id.to_string()))
    }
}

impl Default for ProtocolLibrary {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CustomProtocolDraft, DraftModality};

    fn custom(id_ms: u128) -> Protocol {
        CustomProtocolDraft {
            name: "Evening".into(),
            description: String::new(),
            effects: "Calm".into(),
            carrier_frequency: 210.0,
            modality: DraftModality::Pulse(4.0),
        }
        .build(id_ms)
        .unwrap()
    }

    #[test]
    fn missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProtocolStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_restores_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProtocolStore::in_dir(dir.path().join("nested"));
        store.save(&[custom(1), custom(2)]).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].id, "custom-2");
        assert!(store.path().ends_with("omega_custom_protocols.json"));
    }

    #[test]
    fn malformed_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProtocolStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Format { .. })));
    }

    #[test]
    fn reads_records_written_by_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProtocolStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"[{"id":"custom-5","name":"Mine","description":"","carrierFrequencies":[432],
                "effects":["Calm"],"pulseFrequency":7.83,"isCustom":true}]"#,
        )
        .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].pulse_frequency, Some(7.83));
        assert_eq!(loaded[0].binaural_beat_offset, None);
    }

    #[test]
    fn library_lists_builtins_before_custom() {
        let mut lib = ProtocolLibrary::default();
        lib.add_custom(custom(9));
        let ids: Vec<&str> = lib.all().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 8);
        assert_eq!(ids[0], "cellular-regeneration");
        assert_eq!(ids[7], "custom-9");
        assert!(lib.find("custom-9").is_some());
    }

    #[test]
    fn only_custom_protocols_can_be_removed() {
        let mut lib = ProtocolLibrary::new(vec![custom(3)]);
        assert!(matches!(
            lib.remove_custom("trauma-release"),
            Err(OmegaError::BuiltinProtocol(_))
        ));
        assert!(matches!(lib.remove_custom("nope"), Err(OmegaError::UnknownProtocol(_))));
        assert_eq!(lib.remove_custom("custom-3").unwrap().id, "custom-3");
        assert!(lib.custom().is_empty());
    }
}
