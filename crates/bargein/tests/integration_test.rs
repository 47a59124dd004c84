//! Integration tests for the arbitration pipeline
//!
//! Drives the full loop (speech events -> session -> decision -> playback
//! kill-switch) against a stub controller; no audio hardware or speech
//! services involved.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bargein::{
    event_channel, run_arbitration_loop, Arbitration, ArbiterConfig, ArbiterSession,
    ArbitrationDecision, InterruptionArbiter, SpeechEvent, StubPlayback,
};
use chrono::Utc;
use tokio_test::assert_ok;

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn vad(ms: u64) -> SpeechEvent {
    SpeechEvent::VoiceActivity {
        duration: Duration::from_millis(ms),
        timestamp: Utc::now(),
    }
}

fn interim(text: &str) -> SpeechEvent {
    SpeechEvent::InterimTranscript {
        text: text.to_string(),
    }
}

fn final_t(text: &str) -> SpeechEvent {
    SpeechEvent::FinalTranscript {
        text: text.to_string(),
    }
}

/// Feed a scripted event sequence through the loop and collect decisions.
async fn drive(
    config: &ArbiterConfig,
    playback: &StubPlayback,
    events: Vec<SpeechEvent>,
) -> Vec<Arbitration> {
    let decisions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&decisions);

    let (tx, stream) = event_channel();
    for event in events {
        tx.send(event).expect("loop receiver alive");
    }
    drop(tx);

    let mut session = ArbiterSession::new(InterruptionArbiter::new(config).expect("valid config"));
    let result = run_arbitration_loop(
        stream,
        &mut session,
        playback,
        config.min_voice_activity(),
        Some(Arc::new(move |arb: &Arbitration| {
            sink.lock().unwrap().push(arb.clone());
        })),
    )
    .await;
    assert_ok!(result);

    let collected = decisions.lock().unwrap().clone();
    collected
}

#[tokio::test]
async fn backchanneling_while_agent_speaks_is_ignored() {
    init_logging();
    let config = ArbiterConfig::default();
    let playback = StubPlayback::new();
    playback.start_speaking();

    // VAD fires before any text, then the transcript streams in.
    let decisions = drive(
        &config,
        &playback,
        vec![vad(620), interim("yeah"), interim("yeah okay"), final_t("Yeah, okay.")],
    )
    .await;

    assert!(decisions.iter().all(|a| a.suppressed()));
    let state = playback.state();
    assert!(state.is_speaking, "agent should keep the floor");
    assert!(!state.was_interrupted);
}

#[tokio::test]
async fn command_while_agent_speaks_halts_playback() {
    init_logging();
    let config = ArbiterConfig::default();
    let playback = StubPlayback::new();
    playback.start_speaking();

    let decisions = drive(&config, &playback, vec![vad(700), final_t("No, stop.")]).await;

    assert_eq!(
        decisions.last().unwrap().decision,
        ArbitrationDecision::Allow
    );
    let state = playback.state();
    assert!(!state.is_speaking);
    assert!(state.was_interrupted);
}

#[tokio::test]
async fn early_suppression_is_revoked_when_override_appears() {
    init_logging();
    let config = ArbiterConfig::default();
    let playback = StubPlayback::new();
    playback.start_speaking();

    let decisions = drive(
        &config,
        &playback,
        vec![
            vad(550),
            interim("yeah"),
            interim("yeah but"),
            final_t("Yeah but wait."),
        ],
    )
    .await;

    // vad + first interim suppressed, refinement reveals the command
    assert!(decisions[0].suppressed());
    assert!(decisions[1].suppressed());
    assert!(decisions[2].allowed());
    assert!(decisions[3].allowed());
    assert!(decisions[2].snapshot_seq > decisions[1].snapshot_seq);
    assert!(playback.state().was_interrupted);
}

#[tokio::test]
async fn backchannel_when_agent_silent_is_a_normal_turn() {
    init_logging();
    let config = ArbiterConfig::default();
    let playback = StubPlayback::new();

    let decisions = drive(&config, &playback, vec![interim("yeah"), final_t("Yeah.")]).await;

    assert!(decisions.iter().all(|a| a.allowed()));
    assert!(!playback.state().was_interrupted);
}

#[tokio::test]
async fn sub_threshold_vad_blips_never_interrupt() {
    init_logging();
    let config = ArbiterConfig::default();
    let playback = StubPlayback::new();
    playback.start_speaking();

    let decisions = drive(&config, &playback, vec![vad(120), vad(300)]).await;

    assert!(decisions.iter().all(|a| a.suppressed()));
    assert!(playback.state().is_speaking);
}

#[tokio::test]
async fn consecutive_utterances_are_independent() {
    init_logging();
    let config = ArbiterConfig::default();
    let playback = StubPlayback::new();
    playback.start_speaking();

    let decisions = drive(
        &config,
        &playback,
        vec![
            // first utterance: pure backchannel, settled
            interim("uh huh"),
            final_t("Uh-huh, right."),
            // second utterance: real interruption
            vad(600),
            final_t("Hang on, what about the second one?"),
        ],
    )
    .await;

    assert!(decisions[0].suppressed());
    assert!(decisions[1].suppressed());
    // vad arrives after the final cleared the snapshot: no stale text
    assert!(decisions[2].suppressed());
    assert!(decisions[3].allowed());
    assert!(playback.state().was_interrupted);
}

#[tokio::test]
async fn custom_vocabulary_is_honored() {
    init_logging();
    let config = ArbiterConfig {
        backchannel_phrases: vec!["si".into(), "claro".into()],
        override_phrases: vec!["espera".into(), "para".into()],
        min_voice_activity_ms: 500,
    };
    let playback = StubPlayback::new();
    playback.start_speaking();

    let decisions = drive(
        &config,
        &playback,
        vec![final_t("si claro"), final_t("espera")],
    )
    .await;

    assert!(decisions[0].suppressed());
    assert!(decisions[1].allowed());
    // the built-in English lists are gone: "yeah" is now unknown content
    let playback2 = StubPlayback::new();
    playback2.start_speaking();
    let decisions2 = drive(&config, &playback2, vec![final_t("yeah")]).await;
    assert!(decisions2[0].allowed());
}

#[tokio::test]
async fn overlapping_word_lists_are_rejected_at_construction() {
    let config = ArbiterConfig {
        backchannel_phrases: vec!["yeah".into(), "right".into()],
        override_phrases: vec!["stop".into(), "right".into()],
        min_voice_activity_ms: 500,
    };
    assert!(InterruptionArbiter::new(&config).is_err());
}

#[test]
fn decisions_are_pure_and_replayable() {
    let arbiter = InterruptionArbiter::with_defaults();
    let transcript = [
        ("yeah", true, ArbitrationDecision::Suppress),
        ("yeah but wait", true, ArbitrationDecision::Allow),
        ("yeah", false, ArbitrationDecision::Allow),
        ("", true, ArbitrationDecision::Suppress),
    ];
    // replaying the identical inputs yields identical outcomes
    for _ in 0..2 {
        for (text, speaking, expected) in transcript {
            assert_eq!(arbiter.decide(text, speaking), expected);
        }
    }
}
