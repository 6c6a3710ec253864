use anyhow::{Context, Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::input_normalizer::TimingEntry;

// @module: Caption pairing and the SRT interchange artifact

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @struct: Single caption entry with microsecond timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntry {
    // @field: 1-based contiguous sequence number
    pub seq_num: usize,

    // @field: Start time in microseconds
    pub start_us: i64,

    // @field: End time in microseconds
    pub end_us: i64,

    // @field: Caption text
    pub text: String,
}

impl CaptionEntry {
    /// Creates a new caption entry
    pub fn new(seq_num: usize, start_us: i64, end_us: i64, text: String) -> Self {
        CaptionEntry {
            seq_num,
            start_us,
            end_us,
            text,
        }
    }

    /// Convert start time to a formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_us)
    }

    /// Convert end time to a formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_us)
    }

    /// Format a microsecond timestamp as SRT time (HH:MM:SS,mmm).
    /// Microseconds truncate to milliseconds; negative inputs clamp to zero.
    pub fn format_timestamp(us: i64) -> String {
        let ms = (us / 1000).max(0);
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an SRT timestamp into microseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<i64> {
        let parts: Vec<&str> = timestamp.split([':', ',', '.']).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: i64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: i64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: i64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: i64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok((hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis) * 1000)
    }
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Pair caption texts with their index-aligned timing entries.
///
/// Pairing stops at the shorter list: a caption with no matching timing
/// entry is dropped, never an error. Sequence numbers are reassigned 1-based
/// and contiguous over the surviving prefix.
pub fn pair_captions(captions: &[String], timings: &[TimingEntry]) -> Vec<CaptionEntry> {
    let paired = captions.len().min(timings.len());
    if paired < captions.len() {
        warn!(
            "Dropping {} caption(s) with no matching timing entry",
            captions.len() - paired
        );
    }

    captions
        .iter()
        .zip(timings.iter())
        .take(paired)
        .enumerate()
        .map(|(i, (text, timing))| {
            CaptionEntry::new(i + 1, timing.start_us, timing.end_us, text.clone())
        })
        .collect()
}

/// Write caption entries as an SRT artifact
pub fn write_srt<P: AsRef<Path>>(entries: &[CaptionEntry], path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

    for entry in entries {
        write!(file, "{}", entry)?;
    }

    Ok(())
}

/// Parse an SRT file back into caption entries
pub fn parse_srt_file(path: &Path) -> Result<Vec<CaptionEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
    parse_srt_string(&content)
}

/// Parse SRT format content into caption entries.
///
/// Tolerant of stray blank lines and multi-line caption text. Entries with a
/// malformed timestamp line are skipped with a warning.
pub fn parse_srt_string(content: &str) -> Result<Vec<CaptionEntry>> {
    let mut entries = Vec::new();

    let mut current_seq: Option<usize> = None;
    let mut current_range: Option<(i64, i64)> = None;
    let mut current_text = String::new();

    let mut flush = |seq: &mut Option<usize>, range: &mut Option<(i64, i64)>, text: &mut String| {
        if let (Some(seq_num), Some((start_us, end_us))) = (seq.take(), range.take()) {
            if text.trim().is_empty() {
                warn!("Skipping empty subtitle entry {}", seq_num);
            } else {
                entries.push(CaptionEntry::new(
                    seq_num,
                    start_us,
                    end_us,
                    text.trim().to_string(),
                ));
            }
        }
        text.clear();
    };

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush(&mut current_seq, &mut current_range, &mut current_text);
            continue;
        }

        if current_seq.is_none() && current_text.is_empty() {
            if let Ok(num) = trimmed.parse::<usize>() {
                current_seq = Some(num);
                continue;
            }
        }

        if current_seq.is_some() && current_range.is_none() {
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                let start = timestamp_capture_us(&caps, 1);
                let end = timestamp_capture_us(&caps, 5);
                current_range = Some((start, end));
                continue;
            }
            warn!("Expected timestamp line, got: {}", trimmed);
            current_seq = None;
            continue;
        }

        if current_range.is_some() {
            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(trimmed);
        }
    }

    flush(&mut current_seq, &mut current_range, &mut current_text);

    Ok(entries)
}

fn timestamp_capture_us(caps: &regex::Captures, start_idx: usize) -> i64 {
    let component = |idx: usize| -> i64 {
        caps.get(idx)
            .map_or(0, |m| m.as_str().parse().unwrap_or(0))
    };
    let hours = component(start_idx);
    let minutes = component(start_idx + 1);
    let seconds = component(start_idx + 2);
    let millis = component(start_idx + 3);

    ((hours * 3600 + minutes * 60 + seconds) * 1000 + millis) * 1000
}
