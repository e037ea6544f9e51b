//! Wiring file parsing and layered overlay (§6 "Wiring file format", §4.8
//! "Wiring").
//!
//! A wiring file declares, per factory prefix, the factory's plugin/type
//! identity, its event level, input/output databundle names, and a string
//! map of configuration overrides. Multiple wiring files can be loaded as
//! layers of increasing priority; a higher-priority layer only *completes*
//! fields a lower-priority layer left unspecified — it never clobbers a
//! field the lower-priority layer already set. Duplicate prefixes appearing
//! twice within the *same* layer are rejected outright, since there is no
//! priority ordering to arbitrate between them.

use crate::error::ConfigError;
use crate::error::DuplicatePrefixInLayerSnafu;
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::HashSet;

/// One entry of a wiring file's `wiring` array.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct WiringEntry {
    pub plugin_name: Option<String>,
    pub type_name: Option<String>,
    pub prefix: String,
    pub level: Option<String>,
    #[serde(default)]
    pub input_names: Vec<String>,
    #[serde(default)]
    pub input_levels: Vec<String>,
    #[serde(default)]
    pub output_names: Vec<String>,
    #[serde(default)]
    pub configs: HashMap<String, String>,
}

impl WiringEntry {
    /// Fills fields left unset on `self` with values from `higher`. Fields
    /// `self` already set are left untouched: this is the "higher-priority
    /// completes unspecified fields" rule, applied field by field.
    fn complete_from(&mut self, higher: &WiringEntry) {
        if self.plugin_name.is_none() {
            self.plugin_name = higher.plugin_name.clone();
        }
        if self.type_name.is_none() {
            self.type_name = higher.type_name.clone();
        }
        if self.level.is_none() {
            self.level = higher.level.clone();
        }
        if self.input_names.is_empty() {
            self.input_names = higher.input_names.clone();
        }
        if self.input_levels.is_empty() {
            self.input_levels = higher.input_levels.clone();
        }
        if self.output_names.is_empty() {
            self.output_names = higher.output_names.clone();
        }
        for (k, v) in &higher.configs {
            self.configs.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

/// The raw, `serde`-deserialized shape of one wiring file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WiringFile {
    #[serde(default)]
    pub wiring: Vec<WiringEntry>,
    #[serde(default)]
    pub configs: HashMap<String, String>,
}

impl WiringFile {
    pub fn parse(contents: &str) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
        let de = &mut serde_json::Deserializer::from_str(contents);
        serde_path_to_error::deserialize(de)
    }
}

/// The result of overlaying one or more [`WiringFile`] layers, keyed by
/// factory prefix for O(1) lookup at factory-construction time.
#[derive(Debug, Clone, Default)]
pub struct ResolvedWiring {
    entries: HashMap<String, WiringEntry>,
    shared_configs: HashMap<String, String>,
}

impl ResolvedWiring {
    /// Builds a resolved wiring from `layers`, lowest priority first. Later
    /// layers in the slice are higher priority and only complete fields the
    /// earlier (lower-priority) layers left unset.
    pub fn from_layers(layers: Vec<WiringFile>) -> Result<Self, ConfigError> {
        let mut entries: HashMap<String, WiringEntry> = HashMap::new();
        let mut shared_configs: HashMap<String, String> = HashMap::new();

        for (layer_idx, layer) in layers.into_iter().enumerate() {
            let mut seen_in_layer = HashSet::new();
            for entry in layer.wiring {
                if !seen_in_layer.insert(entry.prefix.clone()) {
                    return DuplicatePrefixInLayerSnafu {
                        layer: layer_idx.to_string(),
                        prefix: entry.prefix,
                    }
                    .fail();
                }
                match entries.get_mut(&entry.prefix) {
                    Some(existing) => existing.complete_from(&entry),
                    None => {
                        entries.insert(entry.prefix.clone(), entry);
                    }
                }
            }
            for (k, v) in layer.configs {
                shared_configs.entry(k).or_insert(v);
            }
        }

        Ok(Self {
            entries,
            shared_configs,
        })
    }

    /// Looks up the resolved wiring for a factory prefix.
    pub fn lookup(&self, prefix: &str) -> Option<&WiringEntry> {
        self.entries.get(prefix)
    }

    /// Looks up a globally shared configuration value.
    pub fn shared(&self, key: &str) -> Option<&str> {
        self.shared_configs.get(key).map(String::as_str)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "wiring.test.rs"]
mod tests;
