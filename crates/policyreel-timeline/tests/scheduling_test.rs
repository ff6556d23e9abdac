use policyreel_core::{equal_power, OutputConfig, TimelineConfig};
use policyreel_ir::validate::validate_segments;
use policyreel_ir::{BackgroundClips, SceneKind, Segment, Storyboard, StoryboardBuilder};
use policyreel_timeline::{
    layout_segments, narration_units, plan, total_duration, ExportManifest, NarrationClip,
    Timeline,
};

fn course(overview: usize, modules: usize) -> Storyboard {
    let mut b = StoryboardBuilder::new("Information Security Awareness")
        .intro("Protecting company data is everyone's job.");
    for i in 0..overview {
        b = b.overview(format!("Overview point {}", i));
    }
    for i in 0..modules {
        b = b.module(format!("Module {}", i), &["First rule", "Second rule"]);
    }
    b.summary("Report anything suspicious.")
        .quiz("Who owns security?", &["IT", "Everyone"], 1)
        .build()
}

fn narrated(count: usize) -> Vec<Segment> {
    (0..count)
        .map(|i| Segment::new(format!("line {}", i), 2.0 + 3.2 * i as f64, 2.9, format!("audio/{}.mp3", i)))
        .collect()
}

#[test]
fn test_plan_is_deterministic() {
    let sb = course(3, 3);
    let segs = narrated(7);
    let clips = BackgroundClips::from_refs(["a", "b", "c", "d", "e"]);
    let cfg = TimelineConfig::default();

    for segments in [None, Some(segs.as_slice())] {
        let first = plan(&sb, segments, Some(&clips), &cfg);
        let second = plan(&sb, segments, Some(&clips), &cfg);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}

#[test]
fn test_fallback_covers_every_module() {
    let cfg = TimelineConfig::default();
    for m in 0..8 {
        let scenes = plan(&course(3, m), None, None, &cfg);
        assert_eq!(scenes.len(), m + 2, "modules = {}", m);
    }
}

#[test]
fn test_fallback_overlap_is_exactly_one_handle() {
    for fps in [24.0, 25.0, 30.0, 60.0] {
        let cfg = TimelineConfig {
            fps,
            ..TimelineConfig::default()
        };
        let scenes = plan(&course(3, 5), None, None, &cfg);
        for pair in scenes.windows(2) {
            let (k, next) = (&pair[0], &pair[1]);
            assert!(next.start_frame < k.end_frame());
            assert_eq!(k.overlap_with(next), cfg.handle_frames, "fps = {}", fps);
        }
        assert_eq!(scenes[0].start_frame, 0);
    }
}

#[test]
fn test_fallback_total_closes_on_last_scene() {
    let cfg = TimelineConfig::default();
    for m in 0..6 {
        let sb = course(3, m);
        let scenes = plan(&sb, None, None, &cfg);
        let total = total_duration(&sb, None, &cfg);
        let last = scenes.last().unwrap();
        assert_eq!(total.duration_in_frames, last.start_frame + last.duration_frames);
        assert!(scenes.iter().all(|s| s.end_frame() <= total.duration_in_frames));
    }
}

#[test]
fn test_surplus_segments_clamp_to_last_module() {
    let cfg = TimelineConfig::default();
    let sb = course(3, 3);

    // Natural count: the seventh segment narrates the summary.
    let scenes = plan(&sb, Some(narrated(7).as_slice()), None, &cfg);
    assert_eq!(scenes[7].kind, SceneKind::Summary);

    // Two extra segments: positions 6 and 7 both land on the last module.
    // The intro title card is scene 0, so segment i is scene i + 1.
    let scenes = plan(&sb, Some(narrated(8).as_slice()), None, &cfg);
    assert_eq!(scenes.len(), 9);
    assert_eq!(scenes[6 + 1].kind, SceneKind::Module(2));
    assert_eq!(scenes[7 + 1].kind, SceneKind::Module(2));
    assert!(scenes.iter().all(|s| match s.kind {
        SceneKind::Module(i) => i < sb.modules.len(),
        _ => true,
    }));
}

#[test]
fn test_background_positional_lookup() {
    let clips = BackgroundClips::from_refs(["A", "B", "C", "D", "E"]);
    let scenes = plan(&course(3, 3), None, Some(&clips), &TimelineConfig::default());
    let by_kind = |kind: SceneKind| {
        scenes
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| s.background_clip.clone())
    };
    assert_eq!(by_kind(SceneKind::Intro).as_deref(), Some("A"));
    assert_eq!(by_kind(SceneKind::Module(0)).as_deref(), Some("B"));
    assert_eq!(by_kind(SceneKind::Module(2)).as_deref(), Some("D"));
    assert_eq!(by_kind(SceneKind::Summary).as_deref(), Some("E"));
}

#[test]
fn test_degenerate_storyboard() {
    let sb = StoryboardBuilder::new("Empty").build();
    let cfg = TimelineConfig::default();
    let scenes = plan(&sb, None, None, &cfg);
    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].kind, SceneKind::Intro);
    assert_eq!(scenes[1].kind, SceneKind::Summary);

    let total = total_duration(&sb, None, &cfg);
    assert!(total.duration_in_frames > 0);
    assert!(total.as_duration().as_seconds().is_finite());

    let tl = Timeline::build(&sb, None, None, &cfg, &OutputConfig::default()).unwrap();
    assert_eq!(tl.scenes, scenes);
}

#[test]
fn test_equal_power_curve() {
    for step in 0..=20 {
        let p = step as f64 / 20.0;
        let (a, b) = equal_power(p);
        assert!((a * a + b * b - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_preview_and_export_agree() {
    let sb = course(3, 3);
    let clips = BackgroundClips::new(vec![
        Some("intro.mp4".into()),
        None,
        Some("m1.mp4".into()),
        Some("m2.mp4".into()),
        Some("summary.mp4".into()),
    ]);
    let timing = TimelineConfig::default();
    let output = OutputConfig::default();

    let units = narration_units(&sb);
    let clips_audio: Vec<NarrationClip> = units
        .iter()
        .enumerate()
        .map(|(i, u)| NarrationClip {
            text: u.text.clone(),
            audio_ref: format!("audio/{}.mp3", i),
            duration_seconds: 1.7 + i as f64 * 0.13,
        })
        .collect();
    let segments = layout_segments(&clips_audio, timing.title_card_seconds, 0.4);

    let preview = Timeline::build(&sb, Some(segments.as_slice()), Some(&clips), &timing, &output)
        .unwrap();
    let export = ExportManifest::build(&sb, &segments, &clips, &timing, &output).unwrap();

    assert_eq!(export.timeline.scenes, preview.scenes);
    assert_eq!(export.composition.duration_in_frames, preview.duration_in_frames);
    assert_eq!(export.fingerprint, preview.fingerprint().unwrap().to_hex());
    export.verify().unwrap();

    for frame in 0..preview.duration_in_frames {
        assert_eq!(preview.sample(frame), export.timeline.sample(frame));
    }

    // Narration built from the storyboard lands on the natural scene order.
    let kinds: Vec<SceneKind> = preview.scenes[1..].iter().map(|s| s.kind).collect();
    let expected: Vec<SceneKind> = units.iter().map(|u| u.kind).collect();
    assert_eq!(kinds, expected);
    assert_eq!(preview.scenes[4].background_clip, None);
}

#[test]
fn test_far_future_segment_builds_without_overflow() {
    let sb = course(0, 1);
    let segs = vec![
        Segment::new("opening", 2.0, 1.0, "0.mp3"),
        Segment::new("late", 1.0e18, 1.0, "1.mp3"),
    ];
    assert!(validate_segments(&segs).is_ok());

    let tl = Timeline::build(
        &sb,
        Some(segs.as_slice()),
        None,
        &TimelineConfig::default(),
        &OutputConfig::default(),
    )
    .unwrap();
    assert!(tl.validate().is_ok());
    assert_eq!(tl.duration_in_frames, u64::MAX);
    assert!(tl.scenes.iter().all(|s| s.end_frame() <= tl.duration_in_frames));
    assert_eq!(tl.sample(0)[0].scene_index, 0);
}
