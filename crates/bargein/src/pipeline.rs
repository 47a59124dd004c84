//! **Arbitration pipeline**: wire speech signals to the playback kill-switch.
//!
//! Consumes a stream of [`SpeechEvent`]s from the external speech pipeline
//! (voice-activity detector and streaming speech recognizer), runs each event
//! through an [`ArbiterSession`], and on Allow while the agent is speaking
//! calls [`PlaybackController::interrupt`]. The controller owns agent speech
//! state; this loop only reads it at decision time.
//!
//! Reversal policy: once playback has been halted, a later Suppress never
//! resumes it, and a later Allow on a refined snapshot simply confirms the
//! interruption already underway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ArbiterResult;
use crate::session::{Arbitration, ArbiterSession};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

/// Signals arriving from the external speech pipeline.
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// Low-latency voice-activity detection: speech energy of `duration` was
    /// observed. Carries no text.
    VoiceActivity {
        duration: Duration,
        timestamp: DateTime<Utc>,
    },
    /// Provisional transcript, subject to revision.
    InterimTranscript { text: String },
    /// Settled transcript for the utterance.
    FinalTranscript { text: String },
}

/// Snapshot of the agent's output-channel state, owned by the playback side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentSpeechState {
    pub is_speaking: bool,
    pub was_interrupted: bool,
}

/// The agent playback/session controller, as seen by the arbitration core.
///
/// The controller is the sole owner of agent speech state transitions
/// (starting, finishing, marking interrupted); the core only reads
/// `is_speaking` and requests a halt.
pub trait PlaybackController: Send + Sync {
    /// Whether the agent currently owns the output channel.
    fn is_speaking(&self) -> bool;

    /// Halt agent audio output immediately.
    fn interrupt(&self);
}

/// Optional callback invoked with every arbitration the loop produces. Use
/// for UI/CLI feedback or structured logging.
pub type OnDecision = Option<Arc<dyn Fn(&Arbitration) + Send + Sync>>;

/// Build an event channel plus a stream suitable for [`run_arbitration_loop`].
pub fn event_channel() -> (
    mpsc::UnboundedSender<SpeechEvent>,
    UnboundedReceiverStream<SpeechEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, UnboundedReceiverStream::new(rx))
}

/// Run the arbitration loop until the event stream ends.
///
/// - Voice-activity events shorter than `min_voice_activity` are noise.
/// - Every transcript update re-decides, so an early Suppress over a
///   truncated snapshot is superseded by a later Allow.
/// - On Allow while the controller reports speaking, `interrupt()` is called
///   before the callback fires.
pub async fn run_arbitration_loop<S>(
    mut events: S,
    session: &mut ArbiterSession,
    controller: &dyn PlaybackController,
    min_voice_activity: Duration,
    on_decision: OnDecision,
) -> ArbiterResult<()>
where
    S: Stream<Item = SpeechEvent> + Unpin,
{
    while let Some(event) = events.next().await {
        let speaking = controller.is_speaking();
        let arbitration = match event {
            SpeechEvent::VoiceActivity { duration, .. } => {
                let exceeds = duration >= min_voice_activity;
                if !exceeds {
                    debug!(
                        "voice activity below threshold ({:?} < {:?}), ignoring",
                        duration, min_voice_activity
                    );
                }
                session.on_voice_activity(exceeds, speaking)
            }
            SpeechEvent::InterimTranscript { text } => {
                session.on_interim_transcript(&text, speaking)
            }
            SpeechEvent::FinalTranscript { text } => session.on_final_transcript(&text, speaking),
        };

        if arbitration.allowed() && speaking {
            controller.interrupt();
            info!(
                seq = arbitration.snapshot_seq,
                "interruption: halting agent playback"
            );
        }

        if let Some(ref cb) = on_decision {
            cb(&arbitration);
        }
    }

    Ok(())
}

/// In-memory playback controller for tests and demos; no audio device.
///
/// Holds [`AgentSpeechState`] behind atomics so the loop can read it from any
/// task.
#[derive(Debug, Default)]
pub struct StubPlayback {
    speaking: AtomicBool,
    interrupted: AtomicBool,
}

impl StubPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the agent as holding the output channel.
    pub fn start_speaking(&self) {
        self.speaking.store(true, Ordering::SeqCst);
        self.interrupted.store(false, Ordering::SeqCst);
    }

    /// Agent finished its utterance normally.
    pub fn finish_speaking(&self) {
        self.speaking.store(false, Ordering::SeqCst);
    }

    pub fn state(&self) -> AgentSpeechState {
        AgentSpeechState {
            is_speaking: self.speaking.load(Ordering::SeqCst),
            was_interrupted: self.interrupted.load(Ordering::SeqCst),
        }
    }
}

impl PlaybackController for StubPlayback {
    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn interrupt(&self) {
        if self.speaking.swap(false, Ordering::SeqCst) {
            self.interrupted.store(true, Ordering::SeqCst);
            info!("StubPlayback: output halted");
        }
    }
}
