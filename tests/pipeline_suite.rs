//! End-to-end pipeline suite over scripted providers.
//!
//! Exercises the full driver sequencing (resolve → plan → generate → render)
//! without external tools: providers replay fixed scripts, the clock records
//! requested waits instead of sleeping, and the renderer records what it was
//! handed.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use common::{
    asset, rate_limited, track, FixedPlanner, RecordingClock, RecordingRenderer, ScriptedAssets,
    ScriptedTranscripts,
};
use scene_gen::{AssetGenerator, GeneratorConfig};
use shorts_common::ProviderError;
use shorts_pipeline::{JobSpec, PipelineDriver, PipelineError, TranscriptSpec};
use transcript::{AcquisitionStrategy, TranscriptResolver};

fn generator_config() -> GeneratorConfig {
    GeneratorConfig {
        max_attempts: 2,
        base_delay: Duration::from_secs(10),
        scene_gap: Duration::from_secs(3),
    }
}

fn strategies() -> Vec<AcquisitionStrategy> {
    vec![
        AcquisitionStrategy::PreferredCaptions {
            languages: vec!["hi".to_string()],
        },
        AcquisitionStrategy::AutoCaptions {
            language: "hi".to_string(),
        },
    ]
}

fn job(output: &str) -> JobSpec {
    JobSpec {
        narration: PathBuf::from("narration.mp3"),
        transcript: TranscriptSpec::Remote {
            source: "vid-123".to_string(),
            strategies: strategies(),
        },
        scene_duration: 5.0,
        total_duration: Some(13.0),
        output: PathBuf::from(output),
    }
}

#[test]
fn full_run_with_fallback_and_substitution() {
    // Manual captions are missing; auto captions resolve.
    let transcripts = ScriptedTranscripts::new(vec![
        Err(ProviderError::NotAvailable("no manual track".to_string())),
        Ok(track("a story about big numbers", "hi")),
    ]);

    // Scene 0 succeeds, scene 1 is throttled through its whole budget,
    // scene 2 succeeds.
    let assets = ScriptedAssets::new(vec![
        Ok(asset("frames/frame_000.png")),
        rate_limited(),
        rate_limited(),
        Ok(asset("frames/frame_002.png")),
    ]);
    let clock = RecordingClock::default();
    let renderer = RecordingRenderer::default();

    let driver = PipelineDriver::new(
        Box::new(FixedPlanner {
            lines: vec![
                "1. Skyline at dawn [TEXT: $250 Billion]".to_string(),
                "2. Handshake close-up".to_string(),
                "3. Servers in a data center".to_string(),
            ],
        }),
        AssetGenerator::with_clock(
            Box::new(assets.clone()),
            generator_config(),
            Box::new(clock.clone()),
        ),
        Box::new(renderer.clone()),
    )
    .with_resolver(TranscriptResolver::new(Box::new(transcripts.clone())));

    let artifacts = driver.run(&job("out.mp4")).expect("pipeline completes");

    // Both transcript strategies were tried, in order.
    assert_eq!(transcripts.tried.borrow().len(), 2);
    assert_eq!(artifacts.transcript, "a story about big numbers");

    // Three prompts; the annotation became overlay text.
    assert_eq!(artifacts.prompts.len(), 3);
    assert_eq!(
        artifacts.prompts[0].overlay.as_deref(),
        Some("$250 Billion")
    );
    assert!(artifacts.prompts[1].overlay.is_none());

    // Scene 1 exhausted its budget and reused scene 0's frame.
    let entries = artifacts.assets.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].reference, asset("frames/frame_000.png"));
    assert!(entries[1].substituted);
    assert!(!entries[2].substituted);
    assert_eq!(*assets.calls.borrow(), 4);

    // Waits: gap before scene 1, one backoff inside it, gap before scene 2.
    assert_eq!(
        *clock.sleeps.borrow(),
        vec![
            Duration::from_secs(3),
            Duration::from_secs(10),
            Duration::from_secs(3),
        ]
    );

    // The renderer received all three frames stretched over the narration.
    let rendered = renderer.rendered.borrow();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].0, 3);
    assert!((rendered[0].1 - 13.0 / 3.0).abs() < 1e-9);

    assert_eq!(artifacts.video, PathBuf::from("out.mp4"));
}

#[test]
fn disabled_source_aborts_before_generation() {
    let transcripts = ScriptedTranscripts::new(vec![Err(ProviderError::Disabled(
        "captions disabled".to_string(),
    ))]);
    let assets = ScriptedAssets::new(vec![]);
    let renderer = RecordingRenderer::default();

    let driver = PipelineDriver::new(
        Box::new(FixedPlanner {
            lines: vec!["unused".to_string()],
        }),
        AssetGenerator::with_clock(
            Box::new(assets.clone()),
            generator_config(),
            Box::new(RecordingClock::default()),
        ),
        Box::new(renderer.clone()),
    )
    .with_resolver(TranscriptResolver::new(Box::new(transcripts.clone())));

    let err = driver.run(&job("out.mp4")).expect_err("resolution fails");

    match err {
        PipelineError::Resolution(failure) => {
            // The auto-caption strategy was never tried.
            assert_eq!(failure.attempted.len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*assets.calls.borrow(), 0);
    assert!(renderer.rendered.borrow().is_empty());
}

#[test]
fn total_generation_failure_surfaces_attempt_log() {
    let transcripts =
        ScriptedTranscripts::new(vec![Ok(track("a story", "en"))]);
    // One scene (total 4s at 5s per scene), throttled on both attempts.
    let assets = ScriptedAssets::new(vec![rate_limited(), rate_limited()]);

    let driver = PipelineDriver::new(
        Box::new(FixedPlanner {
            lines: vec!["one prompt".to_string()],
        }),
        AssetGenerator::with_clock(
            Box::new(assets),
            generator_config(),
            Box::new(RecordingClock::default()),
        ),
        Box::new(RecordingRenderer::default()),
    )
    .with_resolver(TranscriptResolver::new(Box::new(transcripts)));

    let mut job = job("out.mp4");
    job.total_duration = Some(4.0);

    let err = driver.run(&job).expect_err("no assets anywhere");
    match err {
        PipelineError::Generation(scene_gen::GenerationError::NoAssetsGenerated { attempts }) => {
            assert_eq!(attempts.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_durations_fail_before_any_provider_call() {
    let transcripts = ScriptedTranscripts::new(vec![]);
    let assets = ScriptedAssets::new(vec![]);

    let driver = PipelineDriver::new(
        Box::new(FixedPlanner { lines: vec![] }),
        AssetGenerator::with_clock(
            Box::new(assets.clone()),
            generator_config(),
            Box::new(RecordingClock::default()),
        ),
        Box::new(RecordingRenderer::default()),
    )
    .with_resolver(TranscriptResolver::new(Box::new(transcripts.clone())));

    let mut zero_total = job("out.mp4");
    zero_total.total_duration = Some(0.0);
    assert!(matches!(
        driver.run(&zero_total),
        Err(PipelineError::InvalidInput(_))
    ));

    let mut zero_scene = job("out.mp4");
    zero_scene.scene_duration = 0.0;
    assert!(matches!(
        driver.run(&zero_scene),
        Err(PipelineError::InvalidInput(_))
    ));

    assert!(transcripts.tried.borrow().is_empty());
    assert_eq!(*assets.calls.borrow(), 0);
}
