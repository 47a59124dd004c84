//! **Per-session arbitration state**: the transcript snapshot race.
//!
//! Two signal sources drive decisions: a fast voice-activity event that
//! carries no text, and a slower streaming transcript (interim, refined,
//! then final). The session keeps the best currently-known transcript
//! snapshot so the fast path can be decided against whatever text exists at
//! that moment, and re-decides on every refinement: an early Suppress over
//! a truncated snapshot is superseded the moment a fuller one reveals an
//! override command.
//!
//! One `ArbiterSession` per conversation; never share across sessions.

use crate::arbiter::{ArbitrationDecision, InterruptionArbiter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Which external signal triggered a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionTrigger {
    /// Low-latency voice-activity event (no text of its own).
    VoiceActivity,
    /// Provisional speech-recognition result, subject to revision.
    InterimTranscript,
    /// The recognizer's settled result for the utterance.
    FinalTranscript,
}

/// One arbitration outcome, tied to the snapshot it was decided over.
///
/// A fresh value per decision: revoking an earlier Suppress is a later
/// `Arbitration` with a higher `snapshot_seq`, never a mutation of this one.
#[derive(Debug, Clone, Serialize)]
pub struct Arbitration {
    pub decision: ArbitrationDecision,
    pub trigger: DecisionTrigger,
    /// Sequence number of the transcript snapshot this decision saw.
    pub snapshot_seq: u64,
    pub timestamp: DateTime<Utc>,
}

impl Arbitration {
    pub fn suppressed(&self) -> bool {
        self.decision == ArbitrationDecision::Suppress
    }

    pub fn allowed(&self) -> bool {
        self.decision == ArbitrationDecision::Allow
    }
}

/// Session-local decision state: an arbiter plus the evolving best-known
/// transcript for the utterance in flight.
///
/// The agent-speaking flag is supplied by the caller on every hook; the
/// playback controller owns that state, the session only reads it.
pub struct ArbiterSession {
    arbiter: InterruptionArbiter,
    snapshot: String,
    seq: u64,
}

impl ArbiterSession {
    pub fn new(arbiter: InterruptionArbiter) -> Self {
        Self {
            arbiter,
            snapshot: String::new(),
            seq: 0,
        }
    }

    /// Session over the built-in word lists.
    pub fn with_defaults() -> Self {
        Self::new(InterruptionArbiter::with_defaults())
    }

    /// The best transcript text currently known for the utterance in flight.
    pub fn best_transcript(&self) -> &str {
        &self.snapshot
    }

    /// Sequence number of the current snapshot.
    pub fn snapshot_seq(&self) -> u64 {
        self.seq
    }

    /// Voice activity detected. Decides over the best snapshot available at
    /// this moment; a sub-threshold event, or one arriving before any
    /// transcript text exists, is insufficient evidence and resolves like
    /// empty text (Suppress while the agent speaks). That suppression is
    /// provisional; every transcript update re-decides.
    pub fn on_voice_activity(
        &mut self,
        duration_exceeds_threshold: bool,
        agent_speaking: bool,
    ) -> Arbitration {
        let text = if duration_exceeds_threshold {
            self.snapshot.as_str()
        } else {
            ""
        };
        let decision = self.arbiter.decide(text, agent_speaking);
        self.record(decision, DecisionTrigger::VoiceActivity)
    }

    /// A provisional transcript arrived; it replaces the snapshot and the
    /// decision is recomputed over the fuller text.
    pub fn on_interim_transcript(&mut self, text: &str, agent_speaking: bool) -> Arbitration {
        self.update_snapshot(text);
        let decision = self.arbiter.decide(&self.snapshot, agent_speaking);
        self.record(decision, DecisionTrigger::InterimTranscript)
    }

    /// The recognizer settled. Decides over the final text, then clears the
    /// snapshot: the utterance is done and the next one starts from empty.
    pub fn on_final_transcript(&mut self, text: &str, agent_speaking: bool) -> Arbitration {
        self.update_snapshot(text);
        let decision = self.arbiter.decide(&self.snapshot, agent_speaking);
        let arbitration = self.record(decision, DecisionTrigger::FinalTranscript);
        self.snapshot.clear();
        arbitration
    }

    /// Drop any buffered snapshot (e.g. when the session layer abandons an
    /// utterance). The sequence counter keeps advancing.
    pub fn reset(&mut self) {
        self.snapshot.clear();
    }

    fn update_snapshot(&mut self, text: &str) {
        self.snapshot.clear();
        self.snapshot.push_str(text);
        self.seq += 1;
        debug!(seq = self.seq, "transcript snapshot updated: {:?}", text);
    }

    fn record(&self, decision: ArbitrationDecision, trigger: DecisionTrigger) -> Arbitration {
        Arbitration {
            decision,
            trigger,
            snapshot_seq: self.seq,
            timestamp: Utc::now(),
        }
    }
}
