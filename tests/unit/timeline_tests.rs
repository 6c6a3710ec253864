/*!
 * Tests for track/segment assembly and duration computation
 */

use std::path::PathBuf;

use coze2draft::input_normalizer::{AudioItem, DEFAULT_SEGMENT_DURATION_US, ImageItem};
use coze2draft::media_resolver::{ResolutionStatus, ResolvedAudio, ResolvedImage};
use coze2draft::timeline::{TimelineBuilder, TrackKind, audio_duration_us, image_duration_us};

fn resolved_image(index: usize, start_us: i64, end_us: i64) -> ResolvedImage {
    ResolvedImage {
        index,
        item: ImageItem {
            image_url: format!("http://example.com/{}.png", index),
            start_us,
            end_us,
        },
        local_path: PathBuf::from(format!("/materials/image_{}.png", index)),
        status: ResolutionStatus::Direct,
    }
}

fn resolved_audio(index: usize, start_us: i64, end_us: i64, duration_us: i64) -> ResolvedAudio {
    ResolvedAudio {
        index,
        item: AudioItem {
            audio_url: format!("http://example.com/{}.mp3", index),
            start_us,
            end_us,
            duration_us,
        },
        local_path: PathBuf::from(format!("/materials/audio_{}.mp3", index)),
    }
}

/// Test image duration derivation from the time range
#[test]
fn test_image_duration_withValidRange_shouldUseDifference() {
    assert_eq!(image_duration_us(1_000_000, 4_000_000), 3_000_000);
    assert_eq!(image_duration_us(0, 1), 1);
}

/// Test the fixed default when the range is not positive
#[test]
fn test_image_duration_withDegenerateRange_shouldUseDefault() {
    assert_eq!(image_duration_us(0, 0), DEFAULT_SEGMENT_DURATION_US);
    assert_eq!(image_duration_us(5, 5), DEFAULT_SEGMENT_DURATION_US);
    assert_eq!(image_duration_us(10, 3), DEFAULT_SEGMENT_DURATION_US);
}

/// Test audio duration preference order: explicit, range, default
#[test]
fn test_audio_duration_withExplicitDuration_shouldPreferIt() {
    assert_eq!(audio_duration_us(0, 9_000_000, 2_000_000), 2_000_000);
    assert_eq!(audio_duration_us(0, 5_000_000, 0), 5_000_000);
    assert_eq!(audio_duration_us(0, 0, -1), DEFAULT_SEGMENT_DURATION_US);
}

/// Test lazy track creation in the order video, audio
#[test]
fn test_builder_withBothKinds_shouldOrderTracksVideoFirst() {
    let mut builder = TimelineBuilder::new(1080, 1920, "#FFFFFFFF");
    builder.add_image_segments(&[resolved_image(0, 0, 3_000_000)]);
    builder.add_audio_segments(&[resolved_audio(0, 0, 0, 2_000_000)]);

    let doc = builder.build();

    assert_eq!(doc.tracks.len(), 2);
    assert_eq!(doc.tracks[0].kind, TrackKind::Video);
    assert_eq!(doc.tracks[1].kind, TrackKind::Audio);
    assert_eq!(doc.tracks[0].segments.len(), 1);
    assert_eq!(doc.tracks[1].segments.len(), 1);
}

/// Test that tracks are only created for kinds that have items
#[test]
fn test_builder_withNoAudio_shouldNotCreateAudioTrack() {
    let mut builder = TimelineBuilder::new(1080, 1920, "#FFFFFFFF");
    builder.add_image_segments(&[resolved_image(0, 0, 3_000_000)]);
    builder.add_audio_segments(&[]);

    let doc = builder.build();

    assert_eq!(doc.tracks.len(), 1);
    assert!(doc.track(TrackKind::Audio).is_none());
}

/// Test that video segments carry the requested background fill
#[test]
fn test_builder_videoSegments_shouldRequestBackgroundFill() {
    let mut builder = TimelineBuilder::new(1080, 1920, "#FFFFFFFF");
    builder.add_image_segments(&[resolved_image(0, 0, 3_000_000)]);
    builder.add_audio_segments(&[resolved_audio(0, 0, 0, 2_000_000)]);

    let doc = builder.build();

    let video = doc.track(TrackKind::Video).unwrap();
    assert_eq!(video.segments[0].background_fill.as_deref(), Some("#FFFFFFFF"));

    let audio = doc.track(TrackKind::Audio).unwrap();
    assert!(audio.segments[0].background_fill.is_none());
}

/// Test the union upper bound of all segment end times
#[test]
fn test_builder_totalDuration_shouldBeUnionUpperBound() {
    let mut builder = TimelineBuilder::new(1080, 1920, "#FFFFFFFF");
    builder.add_image_segments(&[
        resolved_image(0, 0, 3_000_000),
        resolved_image(1, 3_000_000, 6_000_000),
    ]);
    builder.add_audio_segments(&[resolved_audio(0, 0, 0, 2_000_000)]);

    let doc = builder.build();
    assert_eq!(doc.duration_us, 6_000_000);
}

/// Test that external end times can extend the total duration
#[test]
fn test_builder_extendDuration_shouldOnlyGrow() {
    let mut builder = TimelineBuilder::new(1080, 1920, "#FFFFFFFF");
    builder.add_image_segments(&[resolved_image(0, 0, 3_000_000)]);

    builder.extend_duration(1_000_000);
    builder.extend_duration(8_000_000);

    assert_eq!(builder.build().duration_us, 8_000_000);
}

/// Test that a degenerate range still produces a positive segment duration
#[test]
fn test_builder_withDegenerateRange_shouldSubstituteDefaultDuration() {
    let mut builder = TimelineBuilder::new(1080, 1920, "#FFFFFFFF");
    builder.add_image_segments(&[resolved_image(0, 1_000_000, 1_000_000)]);

    let doc = builder.build();
    let segment = &doc.track(TrackKind::Video).unwrap().segments[0];

    assert_eq!(segment.duration_us, DEFAULT_SEGMENT_DURATION_US);
    assert_eq!(doc.duration_us, 1_000_000 + DEFAULT_SEGMENT_DURATION_US);
}

/// Test that the document carries canvas dimensions and a unique id
#[test]
fn test_builder_document_shouldCarryCanvasAndId() {
    let builder = TimelineBuilder::new(1080, 1920, "#FFFFFFFF");
    let id = builder.document_id().to_string();
    let doc = builder.build();

    assert_eq!(doc.id, id);
    assert!(!doc.id.is_empty());
    assert_eq!(doc.width, 1080);
    assert_eq!(doc.height, 1920);
    assert!(doc.create_time > 0);
}
