use log::*;
use serde::{Deserialize, Serialize};

/// Runtime toggles, stored as JSON in a raw memory segment so they can be
/// flipped from the console without a redeploy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub reset: ResetFeatures,
    pub military: MilitaryFeatures,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetFeatures {
    /// Discard persisted squad state at the start of the tick.
    pub memory: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilitaryFeatures {
    pub enabled: bool,
    pub kiting: bool,
    pub heal_allies: bool,
    pub log_intents: bool,
}

impl Default for MilitaryFeatures {
    fn default() -> MilitaryFeatures {
        MilitaryFeatures {
            enabled: true,
            kiting: true,
            heal_allies: true,
            log_intents: false,
        }
    }
}

impl Features {
    /// Parses the raw segment contents. Missing or invalid data falls back to
    /// defaults.
    pub fn load(raw: Option<&str>) -> Features {
        match raw.map(str::trim).filter(|data| !data.is_empty()) {
            Some(data) => serde_json::from_str(data).unwrap_or_else(|err| {
                warn!("Failed to parse features, using defaults: {}", err);

                Features::default()
            }),
            None => Features::default(),
        }
    }
}
