//! Example: Interruption Arbitration Demo
//!
//! Simulates a conversation against a stub playback controller: the user
//! backchannels while the agent speaks (ignored), then barges in with an
//! override command (playback halted). No microphone or speech services
//! required.

use std::sync::Arc;
use std::time::Duration;

use bargein::{
    event_channel, run_arbitration_loop, Arbitration, ArbiterConfig, ArbiterSession,
    InterruptionArbiter, OnDecision, SpeechEvent, StubPlayback,
};
use chrono::Utc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Interruption Arbitration Demo");
    info!("=============================");

    let config = ArbiterConfig::default();
    let min_voice_activity = config.min_voice_activity();
    let mut session = ArbiterSession::new(InterruptionArbiter::new(&config)?);

    let playback = Arc::new(StubPlayback::new());
    let (events, stream) = event_channel();

    let on_decision: OnDecision = Some(Arc::new(|arb: &Arbitration| {
        println!(
            "decision: {}",
            serde_json::to_string(arb).expect("arbitration serializes")
        );
    }));

    let loop_playback = Arc::clone(&playback);
    let arbitration_loop = tokio::spawn(async move {
        run_arbitration_loop(
            stream,
            &mut session,
            loop_playback.as_ref(),
            min_voice_activity,
            on_decision,
        )
        .await
    });

    // Scenario 1: the agent is explaining something; the user nods along.
    playback.start_speaking();
    info!("agent speaking; user says \"yeah\" (backchannel)");
    events.send(SpeechEvent::VoiceActivity {
        duration: Duration::from_millis(620),
        timestamp: Utc::now(),
    })?;
    events.send(SpeechEvent::InterimTranscript { text: "yeah".into() })?;
    events.send(SpeechEvent::FinalTranscript { text: "Yeah.".into() })?;
    settle().await;
    info!("agent still speaking: {}", playback.state().is_speaking);

    // Scenario 2: a truncated interim looks like backchannel, the refined
    // snapshot reveals an override; the early suppression is revoked.
    info!("user says \"yeah but wait\" (override revealed mid-utterance)");
    events.send(SpeechEvent::InterimTranscript { text: "yeah".into() })?;
    events.send(SpeechEvent::InterimTranscript {
        text: "yeah but".into(),
    })?;
    events.send(SpeechEvent::FinalTranscript {
        text: "Yeah but wait.".into(),
    })?;
    settle().await;
    info!("agent state after barge-in: {:?}", playback.state());

    // Scenario 3: the agent is silent; the same word is a normal turn.
    info!("agent silent; user says \"yeah\" (normal turn, nothing to halt)");
    events.send(SpeechEvent::FinalTranscript { text: "Yeah.".into() })?;
    settle().await;

    drop(events);
    arbitration_loop.await??;

    info!("demo complete");
    Ok(())
}

async fn settle() {
    // Let the loop drain the channel before flipping playback state.
    tokio::time::sleep(Duration::from_millis(50)).await;
}
