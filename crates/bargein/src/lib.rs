//! # Bargein - Real-time Interruption Arbitration
//!
//! This crate decides, in real time, whether a user's spoken utterance should
//! interrupt an actively-speaking conversational agent or be ignored as a
//! passive acknowledgment ("backchannel"). Audio capture, VAD inference, STT
//! and TTS playback are external collaborators behind narrow interfaces.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Arbitration Pipeline                       │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
//! │  │  VAD events  │→ │   Arbiter    │→ │  Playback    │      │
//! │  │  transcripts │  │   Session    │  │  Controller  │      │
//! │  └──────────────┘  └──────┬───────┘  └──────────────┘      │
//! │                           ↓                 ↑               │
//! │                  ┌──────────────┐     Kill Signal           │
//! │                  │  Utterance   │─────────────┘             │
//! │                  │  Classifier  │    (Allow while speaking) │
//! │                  └──────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The race between the fast, text-free voice-activity signal and the slower
//! streaming transcript is resolved by deciding against the best snapshot
//! available at each event and re-deciding on every refinement; see
//! [`session`] for details.

pub mod arbiter;
pub mod classifier;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;

pub use arbiter::{ArbitrationDecision, InterruptionArbiter};
pub use classifier::{normalize, Classification, UtteranceClassifier};
pub use config::{default_backchannel_phrases, default_override_phrases, ArbiterConfig};
pub use error::{ArbiterError, ArbiterResult};
pub use pipeline::{
    event_channel, run_arbitration_loop, AgentSpeechState, OnDecision, PlaybackController,
    SpeechEvent, StubPlayback,
};
pub use session::{Arbitration, ArbiterSession, DecisionTrigger};
