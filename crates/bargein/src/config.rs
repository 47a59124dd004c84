//! Configuration for the arbitration core.
//!
//! Word lists are the whole configuration surface: two sets of phrases,
//! injected at construction and immutable afterwards, so sessions with
//! different vocabularies can coexist. Loadable from TOML for deployments
//! that tune the vocabulary per agent.

use std::path::Path;
use std::time::Duration;

use crate::error::{ArbiterError, ArbiterResult};
use serde::{Deserialize, Serialize};

/// Built-in backchannel vocabulary: short passive acknowledgments.
pub fn default_backchannel_phrases() -> Vec<String> {
    [
        "yeah",
        "yup",
        "yep",
        "yes",
        "ok",
        "okay",
        "alright",
        "right",
        "uh-huh",
        "uh huh",
        "uhuh",
        "hmm",
        "hm",
        "mm",
        "mmhm",
        "mhm",
        "aha",
        "ah",
        "ooh",
        "oh",
        "cool",
        "sure",
        "i see",
        "i understand",
        "got it",
        "understood",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Built-in override vocabulary: words that always interrupt agent speech.
pub fn default_override_phrases() -> Vec<String> {
    [
        "stop",
        "wait",
        "hold",
        "pause",
        "hang on",
        "hold on",
        "no",
        "nope",
        "not",
        "don't",
        "cant",
        "can't",
        "repeat",
        "again",
        "back",
        "slower",
        "faster",
        "louder",
        "quieter",
        "but",
        "however",
        "actually",
        "well",
        "look",
        "listen",
        "excuse me",
        "pardon me",
        "sorry",
        "what",
        "huh",
        "pardon",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Configuration for interruption arbitration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Phrases ignored as passive acknowledgments while the agent speaks.
    pub backchannel_phrases: Vec<String>,

    /// Phrases that always interrupt, regardless of agent state.
    pub override_phrases: Vec<String>,

    /// Voice-activity events shorter than this are treated as noise
    /// (default: 500ms).
    pub min_voice_activity_ms: u64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            backchannel_phrases: default_backchannel_phrases(),
            override_phrases: default_override_phrases(),
            min_voice_activity_ms: 500,
        }
    }
}

impl ArbiterConfig {
    /// Minimum voice-activity duration as a [`Duration`].
    pub fn min_voice_activity(&self) -> Duration {
        Duration::from_millis(self.min_voice_activity_ms)
    }

    /// Parse from a TOML document. Missing fields fall back to the defaults.
    pub fn from_toml_str(s: &str) -> ArbiterResult<Self> {
        toml::from_str(s).map_err(|e| ArbiterError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ArbiterResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
