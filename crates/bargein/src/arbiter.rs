//! **Interruption arbitration**: should user speech halt the agent?
//!
//! A single pure decision over (current best transcript text, agent-speaking
//! flag). Override commands always win, speech while the agent is silent is
//! always a normal turn, and pure backchannel while the agent holds the floor
//! is suppressed. The arbiter never blocks and never fails; the caller
//! re-invokes `decide` on every transcript refinement, so an early Suppress
//! over a truncated snapshot is revoked as soon as a fuller one reveals an
//! override.

use crate::classifier::{normalize, UtteranceClassifier};
use crate::config::ArbiterConfig;
use crate::error::ArbiterResult;
use serde::Serialize;
use tracing::debug;

/// The outcome of one arbitration: drop the utterance or let it interrupt.
///
/// Produced once per triggering event and consumed immediately, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationDecision {
    /// Passive acknowledgment (or no usable text yet) while the agent is
    /// speaking: ignore it, playback continues.
    Suppress,
    /// Real interruption attempt or normal conversational turn: act on it.
    Allow,
}

/// Stateless decision unit over an immutable [`UtteranceClassifier`].
///
/// Session state (agent-speaking, transcript snapshots) lives with the
/// caller; each `decide` call is idempotent and replayable.
#[derive(Debug, Clone)]
pub struct InterruptionArbiter {
    classifier: UtteranceClassifier,
}

impl InterruptionArbiter {
    /// Build an arbiter from configured word lists.
    pub fn new(config: &ArbiterConfig) -> ArbiterResult<Self> {
        let classifier =
            UtteranceClassifier::new(&config.backchannel_phrases, &config.override_phrases)?;
        Ok(Self { classifier })
    }

    /// Arbiter over the built-in word lists.
    pub fn with_defaults() -> Self {
        Self {
            classifier: UtteranceClassifier::with_defaults(),
        }
    }

    /// Wrap an existing classifier.
    pub fn from_classifier(classifier: UtteranceClassifier) -> Self {
        Self { classifier }
    }

    /// Access the underlying classifier.
    pub fn classifier(&self) -> &UtteranceClassifier {
        &self.classifier
    }

    /// Decide whether `text` should interrupt the agent.
    ///
    /// Ordering is the core contract:
    /// 1. override command present → [`ArbitrationDecision::Allow`], regardless of agent state;
    /// 2. agent not speaking → `Allow` (any speech is a normal turn);
    /// 3. empty/whitespace-only text while speaking → [`ArbitrationDecision::Suppress`]
    ///    (no evidence yet, e.g. a voice-activity event that outran the transcript);
    /// 4. pure backchannel while speaking → `Suppress`;
    /// 5. anything else while speaking → `Allow` (conservative: treat as a
    ///    real interruption attempt).
    pub fn decide(&self, text: &str, agent_speaking: bool) -> ArbitrationDecision {
        let tokens = normalize(text);

        if self.classifier.tokens_contain_override(&tokens) {
            debug!("override command present, allowing interruption: {:?}", text);
            return ArbitrationDecision::Allow;
        }
        if !agent_speaking {
            return ArbitrationDecision::Allow;
        }
        if tokens.is_empty() {
            debug!("no usable transcript text while agent speaking, suppressing");
            return ArbitrationDecision::Suppress;
        }
        if self.classifier.tokens_are_backchannel(&tokens) {
            debug!("backchannel while agent speaking, suppressing: {:?}", text);
            return ArbitrationDecision::Suppress;
        }
        ArbitrationDecision::Allow
    }
}

impl Default for InterruptionArbiter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
