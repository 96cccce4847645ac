//! Zone registry
//!
//! Immutable mapping from zone identifier to segment set and default
//! cleaning mode. Built once from configuration at startup and shared
//! read-only behind an `Arc`; concurrent lookups from intake surfaces need
//! no locking because nothing ever writes after construction.

use crate::config::Config;
use sdk::errors::EngineError;
use sdk::types::{CleaningMode, SegmentId};
use std::collections::{BTreeSet, HashMap};

/// A named virtual cleaning target mapping to one or more robot segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Display name (the zone key when the config gives none)
    pub name: String,

    /// Deduplicated segment ids, ascending
    pub segments: BTreeSet<SegmentId>,

    /// Mode used when a request carries no override
    pub default_mode: CleaningMode,
}

/// Read-only zone lookup table.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: HashMap<String, Zone>,
}

impl ZoneRegistry {
    /// Build the registry from configuration.
    ///
    /// Re-checks the zone table invariants (non-empty table, non-empty
    /// segment lists, positive segment ids) so the registry holds them
    /// regardless of how the `Config` was produced. Violations are startup
    /// failures, never runtime ones.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        if config.zones.is_empty() {
            return Err(EngineError::Config(
                "At least one zone must be configured".to_string(),
            ));
        }

        let mut zones = HashMap::with_capacity(config.zones.len());
        for (id, entry) in &config.zones {
            if entry.segments.is_empty() {
                return Err(EngineError::Config(format!(
                    "Zone '{}' has no segments",
                    id
                )));
            }
            if entry.segments.iter().any(|segment| *segment == 0) {
                return Err(EngineError::Config(format!(
                    "Zone '{}' contains segment id 0; segment ids are positive",
                    id
                )));
            }

            let zone = Zone {
                name: entry.name.clone().unwrap_or_else(|| id.clone()),
                segments: entry.segments.iter().copied().collect(),
                default_mode: entry.cleaning_mode.unwrap_or(CleaningMode::Sweeping),
            };
            zones.insert(id.clone(), zone);
        }

        Ok(Self { zones })
    }

    /// Look up a zone by identifier.
    pub fn resolve(&self, zone_id: &str) -> Result<&Zone, EngineError> {
        self.zones
            .get(zone_id)
            .ok_or_else(|| EngineError::UnknownZone(zone_id.to_string()))
    }

    /// All zone identifiers, sorted for stable output.
    pub fn zone_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.zones.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of configured zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the registry holds no zones. Construction rejects an empty
    /// table, so this is false for any registry built from config.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_from(toml_str: &str) -> Result<ZoneRegistry, EngineError> {
        let config: Config = toml::from_str(toml_str).expect("fixture must parse");
        ZoneRegistry::from_config(&config)
    }

    #[test]
    fn resolves_configured_zones() {
        let registry = registry_from(
            r#"
[device]
test_mode = true

[zones.kitchen]
segments = [3, 3, 1]
cleaning_mode = "sweeping_and_mopping"

[zones.hallway]
name = "Hallway and entry"
segments = [2]
"#,
        )
        .unwrap();

        let kitchen = registry.resolve("kitchen").unwrap();
        assert_eq!(kitchen.name, "kitchen");
        // duplicates collapse into the set
        assert_eq!(kitchen.segments.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(kitchen.default_mode, CleaningMode::SweepingAndMopping);

        let hallway = registry.resolve("hallway").unwrap();
        assert_eq!(hallway.name, "Hallway and entry");
        assert_eq!(hallway.default_mode, CleaningMode::Sweeping);
    }

    #[test]
    fn unknown_zone_is_an_error() {
        let registry = registry_from(
            r#"
[device]
test_mode = true

[zones.kitchen]
segments = [3]
"#,
        )
        .unwrap();

        match registry.resolve("garage") {
            Err(EngineError::UnknownZone(zone)) => assert_eq!(zone, "garage"),
            other => panic!("expected UnknownZone, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn zone_ids_are_sorted() {
        let registry = registry_from(
            r#"
[device]
test_mode = true

[zones.kitchen]
segments = [3]

[zones.bedroom]
segments = [4]

[zones.hallway]
segments = [2]
"#,
        )
        .unwrap();
        assert_eq!(registry.zone_ids(), vec!["bedroom", "hallway", "kitchen"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(registry_from("[device]\ntest_mode = true\n[zones]\n").is_err());
        assert!(registry_from(
            "[device]\ntest_mode = true\n[zones.kitchen]\nsegments = []\n"
        )
        .is_err());
        assert!(registry_from(
            "[device]\ntest_mode = true\n[zones.kitchen]\nsegments = [0]\n"
        )
        .is_err());
    }
}
