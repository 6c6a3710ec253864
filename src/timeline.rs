use std::fmt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::input_normalizer::DEFAULT_SEGMENT_DURATION_US;
use crate::media_resolver::{ResolvedAudio, ResolvedImage};

// @module: Ordered track/segment assembly and the timeline aggregate

/// Kind of a timeline track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

impl TrackKind {
    /// Serialized track type identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One placed media reference with a half-open time range on a track
#[derive(Debug, Clone)]
pub struct Segment {
    /// Local media resource backing this segment
    pub material_path: PathBuf,
    /// Start of the target time range in microseconds
    pub start_us: i64,
    /// Length of the target time range in microseconds; always positive
    pub duration_us: i64,
    /// Whole-canvas solid fill color requested for this segment, if any
    pub background_fill: Option<String>,
}

impl Segment {
    /// Exclusive end of the target time range
    pub fn end_us(&self) -> i64 {
        self.start_us + self.duration_us
    }
}

/// An ordered list of segments of one kind
#[derive(Debug, Clone)]
pub struct Track {
    /// Track kind
    pub kind: TrackKind,
    /// Track name within the document
    pub name: String,
    /// Segments in input order
    pub segments: Vec<Segment>,
}

/// Aggregate root describing one draft timeline.
/// Created once per run and never mutated after publication.
#[derive(Debug, Clone)]
pub struct TimelineDocument {
    /// Unique document identifier
    pub id: String,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Creation timestamp, UNIX seconds
    pub create_time: i64,
    /// Last-update timestamp, UNIX seconds
    pub update_time: i64,
    /// Tracks in creation order: video, audio, text
    pub tracks: Vec<Track>,
    /// Union upper bound of all segment end times, in microseconds
    pub duration_us: i64,
}

impl TimelineDocument {
    /// Look up a track by kind
    pub fn track(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }
}

/// Effective duration for an image segment: `end - start` when positive,
/// otherwise the fixed default.
pub fn image_duration_us(start_us: i64, end_us: i64) -> i64 {
    if end_us > start_us {
        end_us - start_us
    } else {
        DEFAULT_SEGMENT_DURATION_US
    }
}

/// Effective duration for an audio segment: the explicit duration when
/// positive, then `end - start`, then the fixed default.
pub fn audio_duration_us(start_us: i64, end_us: i64, duration_us: i64) -> i64 {
    if duration_us > 0 {
        duration_us
    } else {
        image_duration_us(start_us, end_us)
    }
}

/// Assembles resolved media into ordered tracks with a running total duration
pub struct TimelineBuilder {
    doc: TimelineDocument,
    background_color: String,
}

impl TimelineBuilder {
    /// Start a new timeline for the given canvas
    pub fn new(width: u32, height: u32, background_color: &str) -> Self {
        let now = unix_now_secs();
        TimelineBuilder {
            doc: TimelineDocument {
                id: Uuid::new_v4().to_string(),
                width,
                height,
                create_time: now,
                update_time: now,
                tracks: Vec::new(),
                duration_us: 0,
            },
            background_color: background_color.to_string(),
        }
    }

    /// The generated document identifier
    pub fn document_id(&self) -> &str {
        &self.doc.id
    }

    /// Append one video segment per resolved image, creating the video track
    /// lazily on the first item. Each segment requests a whole-canvas
    /// background fill to avoid letterboxing on the portrait canvas.
    pub fn add_image_segments(&mut self, images: &[ResolvedImage]) {
        for resolved in images {
            let start = resolved.item.start_us;
            let duration = image_duration_us(start, resolved.item.end_us);
            let segment = Segment {
                material_path: resolved.local_path.clone(),
                start_us: start,
                duration_us: duration,
                background_fill: Some(self.background_color.clone()),
            };
            self.push_segment(TrackKind::Video, "images", segment);
        }
    }

    /// Append one audio segment per resolved audio item, creating the audio
    /// track lazily on the first item.
    pub fn add_audio_segments(&mut self, audios: &[ResolvedAudio]) {
        for resolved in audios {
            let start = resolved.item.start_us;
            let duration =
                audio_duration_us(start, resolved.item.end_us, resolved.item.duration_us);
            let segment = Segment {
                material_path: resolved.local_path.clone(),
                start_us: start,
                duration_us: duration,
                background_fill: None,
            };
            self.push_segment(TrackKind::Audio, "audios", segment);
        }
    }

    /// Raise the total duration to cover an end time from outside the
    /// video/audio tracks (caption entries count toward the union bound too)
    pub fn extend_duration(&mut self, end_us: i64) {
        if end_us > self.doc.duration_us {
            self.doc.duration_us = end_us;
        }
    }

    fn push_segment(&mut self, kind: TrackKind, name: &str, segment: Segment) {
        let end = segment.end_us();

        match self.doc.tracks.iter_mut().find(|t| t.kind == kind) {
            Some(track) => track.segments.push(segment),
            None => self.doc.tracks.push(Track {
                kind,
                name: name.to_string(),
                segments: vec![segment],
            }),
        }

        self.extend_duration(end);
    }

    /// Finalize the aggregate
    pub fn build(self) -> TimelineDocument {
        self.doc
    }
}

fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
