//! 端到端流程测试：脚本 → 分段 → 音色 → 合成（假客户端）→ 混音（记录引擎）→ 存储

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use soundstage::application::mixer::{MixOptions, MixerSettings, MixingEngine, RenderedSegment};
use soundstage::application::ports::{MixStage, OutputCodec};
use soundstage::application::{ProduceEpisodeCommand, ProduceEpisodeConfig, ProduceEpisodeHandler};
use soundstage::domain::audio::{wav, PcmFormat};
use soundstage::domain::script::{parse, SceneType, Segment, SilenceKind};
use soundstage::domain::sfx::SfxRole;
use soundstage::domain::voice::{detect_gender, Gender, VoiceCatalog, VoiceResolver};
use soundstage::infrastructure::adapters::{
    FakeSfxClient, FakeTtsClient, FileBlobStore, RecordingAudioEngine, SymphoniaProbe,
};

fn without_ending(segments: Vec<Segment>) -> Vec<Segment> {
    segments.into_iter().filter(|s| !s.is_ending_lock()).collect()
}

#[test]
fn scenario_a_dialogue_and_sound() {
    let segments = without_ending(parse(
        "NARRATOR\nHello there.\n(SOUND: door creak)\nVIKRAM [cold]\nSit down.",
    ));

    assert_eq!(segments.len(), 3);
    match &segments[0] {
        Segment::Dialogue { speaker, text, .. } => {
            assert_eq!(speaker, "NARRATOR");
            assert_eq!(text, "Hello there.");
        }
        other => panic!("expected dialogue, got {:?}", other),
    }
    match &segments[1] {
        Segment::Sfx { cue, .. } => assert_eq!(cue, "door creak"),
        other => panic!("expected sfx, got {:?}", other),
    }
    match &segments[2] {
        Segment::Dialogue {
            speaker,
            text,
            emotion,
            ..
        } => {
            assert_eq!(speaker, "VIKRAM");
            assert_eq!(text, "Sit down.");
            assert_eq!(emotion.as_deref(), Some("cold"));
        }
        other => panic!("expected dialogue, got {:?}", other),
    }
}

#[test]
fn scenario_b_explicit_silence() {
    let segments = parse("NARRATOR: Wait.\n(SILENCE: 2.5 seconds)\nNARRATOR: Now.");
    let silence = segments
        .iter()
        .find_map(|s| match s {
            Segment::Silence {
                duration_secs,
                silence: SilenceKind::Pause,
                ..
            } => Some(*duration_secs),
            _ => None,
        })
        .expect("silence segment");
    assert_eq!(silence, 2.5);
}

#[test]
fn scenario_c_distinct_stable_voices() {
    let catalog = Arc::new(VoiceCatalog::default());
    let mut resolver = VoiceResolver::new(catalog.clone(), "neutral", HashMap::new());

    let arjun = resolver.resolve("ARJUN");
    let priya = resolver.resolve("PRIYA");
    assert_ne!(arjun, priya);

    let pool = &catalog.pool("neutral").unwrap().voices;
    assert_eq!(detect_gender("ARJUN"), Gender::Male);
    assert!(pool.male.contains(&arjun));
    assert!(pool.female.contains(&priya));

    for _ in 0..3 {
        assert_eq!(resolver.resolve("ARJUN"), arjun);
        assert_eq!(resolver.resolve("Priya:"), priya);
    }
}

#[tokio::test]
async fn scenario_d_mix_duration_includes_ending() {
    let format = PcmFormat::default();
    let recorder = Arc::new(RecordingAudioEngine::new());
    let mixer = MixingEngine::new(
        recorder.clone(),
        MixerSettings {
            codec: OutputCodec::Wav(format),
            ..MixerSettings::default()
        },
    );

    let segments: Vec<RenderedSegment> = [2.0, 3.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, secs)| {
            RenderedSegment::new(
                i,
                Segment::Dialogue {
                    speaker: "NARRATOR".to_string(),
                    emotion: None,
                    text: "Line.".to_string(),
                    scene: SceneType::Normal,
                },
                wav::tone(*secs, 200.0, 0.3, format),
            )
        })
        .collect();

    let options = MixOptions {
        end_with_silence: true,
        ending_silence_secs: 3.0,
        ..MixOptions::default()
    };
    let output = mixer.mix(&segments, None, &options).await.unwrap();

    assert!(output.duration_secs >= 10.0 - 1e-3, "got {}", output.duration_secs);
    assert!(wav::duration_secs(&output.audio).unwrap() >= 10.0 - 1e-3);
}

#[tokio::test]
async fn produce_episode_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let format = PcmFormat::default();
    let recorder = Arc::new(RecordingAudioEngine::new());
    let mixer = MixingEngine::new(
        recorder.clone(),
        MixerSettings {
            codec: OutputCodec::Wav(format),
            ..MixerSettings::default()
        },
    );
    let store = FileBlobStore::new(dir.path(), Some("https://cdn.example.com/".to_string()))
        .await
        .unwrap();

    let handler = ProduceEpisodeHandler::new(
        Arc::new(FakeTtsClient::with_defaults()),
        Arc::new(FakeSfxClient::new(format)),
        Arc::new(mixer),
        Arc::new(SymphoniaProbe::new()),
        Arc::new(store),
        Arc::new(VoiceCatalog::default()),
        ProduceEpisodeConfig {
            request_delay: Duration::ZERO,
            ..ProduceEpisodeConfig::default()
        },
    );

    let script = "INT. HOSPITAL WARD - NIGHT\n\
                  NARRATOR: The monitors hum in the dark.\n\
                  (SOUND: heartbeat monitor beeping)\n\
                  PRIYA [scared]: Is someone there?\n\
                  (SILENCE: 1 second)\n\
                  ARJUN: It's only me.";
    let mut cmd = ProduceEpisodeCommand::new(script);
    cmd.music = Some(wav::tone(5.0, 110.0, 0.1, format));

    let response = handler.handle(cmd).await.unwrap();

    assert!(response.url.starts_with("https://cdn.example.com/episodes/"));
    assert!(dir.path().join(&response.key).exists());
    assert!(response.skipped.is_empty());
    assert!(response.duration_secs > response.backbone_secs);
    assert!(response.events.iter().any(|e| e.role == SfxRole::Bed));

    let stages = recorder.stages().await;
    assert_eq!(stages.first(), Some(&MixStage::SegmentProcessing));
    assert!(stages.contains(&MixStage::SfxBus));
    assert!(stages.contains(&MixStage::MusicBed));
    assert_eq!(stages.last(), Some(&MixStage::Loudness));
}
