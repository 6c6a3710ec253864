use anyhow::{Context, Result, anyhow};
use log::debug;
use serde_json::Value;

// @module: Defensive decoding of the loosely-typed Coze payload

/// Maximum recursion depth when unwrapping string-encoded JSON fields.
/// Payloads have been observed encoded more than once; the bound keeps a
/// pathological input from recursing forever.
pub const MAX_DECODE_DEPTH: usize = 8;

/// Fixed duration substituted when a source item yields no positive duration
pub const DEFAULT_SEGMENT_DURATION_US: i64 = 3_000_000;

/// Decode a field that may be a structured container or a (possibly repeatedly)
/// string-encoded one.
///
/// Arrays and objects are returned as-is. Strings are parsed as JSON and the
/// result decoded again, up to [`MAX_DECODE_DEPTH`] levels. Any parse failure
/// at any depth, and any value that never resolves to a container, yields an
/// empty array. This function never errors - the contract is best effort,
/// empty on failure.
pub fn decode_maybe_nested(value: &Value) -> Value {
    decode_bounded(value, MAX_DECODE_DEPTH)
}

fn decode_bounded(value: &Value, depth: usize) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => value.clone(),
        Value::String(s) if depth > 0 => match serde_json::from_str::<Value>(s) {
            Ok(inner) => decode_bounded(&inner, depth - 1),
            Err(_) => Value::Array(Vec::new()),
        },
        _ => Value::Array(Vec::new()),
    }
}

/// Normalize a heterogeneous time value to integer microseconds.
///
/// Accepts booleans (0/1), integers, floats, and strings holding either an
/// integer or a decimal number. Strings are trimmed; an empty or unparsable
/// string yields `default`, as does any other JSON type (null, array,
/// object), which have no numeric coercion. Fractional values round
/// half-away-from-zero (`f64::round`), so `"12.5"` normalizes to 13.
/// Idempotent: applying it to its own output returns the same value.
pub fn to_microseconds(value: &Value, default: i64) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64() {
                f.round() as i64
            } else {
                default
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return default;
            }
            if let Ok(i) = s.parse::<i64>() {
                i
            } else if let Ok(f) = s.parse::<f64>() {
                f.round() as i64
            } else {
                default
            }
        }
        _ => default,
    }
}

fn field_us(item: &Value, key: &str) -> i64 {
    to_microseconds(item.get(key).unwrap_or(&Value::Null), 0)
}

fn field_str(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// One image entry from the payload's `image_list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    /// Source URL; empty when absent
    pub image_url: String,
    /// Start time in microseconds
    pub start_us: i64,
    /// End time in microseconds
    pub end_us: i64,
}

/// One audio entry from the payload's `audio_list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioItem {
    /// Source URL; empty when absent
    pub audio_url: String,
    /// Start time in microseconds
    pub start_us: i64,
    /// End time in microseconds
    pub end_us: i64,
    /// Explicit duration in microseconds; 0 when absent
    pub duration_us: i64,
}

/// One caption timing entry from `text_timelines`, aligned by index to `text_cap`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingEntry {
    /// Start time in microseconds
    pub start_us: i64,
    /// End time in microseconds
    pub end_us: i64,
}

/// The normalized top-level payload
#[derive(Debug, Clone, Default)]
pub struct DraftPayload {
    /// Ordered image items
    pub images: Vec<ImageItem>,
    /// Ordered audio items
    pub audios: Vec<AudioItem>,
    /// Document-level background fallback image URL
    pub background_url: Option<String>,
    /// Caption texts, positions preserved for timing alignment
    pub captions: Vec<String>,
    /// Caption timing entries, index-aligned to `captions`
    pub timings: Vec<TimingEntry>,
    /// Descriptive fields used only for title composition
    pub topic: String,
    pub hook_type: String,
    pub output_language: String,
}

impl DraftPayload {
    /// Parse the raw input into a normalized payload.
    ///
    /// An unparsable top-level document is fatal; every nested field
    /// degrades to empty via [`decode_maybe_nested`].
    pub fn parse(raw: &str) -> Result<Self> {
        let data: Value =
            serde_json::from_str(raw.trim()).context("Failed to parse top-level payload as JSON")?;
        if !data.is_object() {
            return Err(anyhow!("Top-level payload must be a JSON object"));
        }

        let images = Self::parse_images(&decode_maybe_nested(
            data.get("image_list").unwrap_or(&Value::Null),
        ));
        let audios = Self::parse_audios(&decode_maybe_nested(
            data.get("audio_list").unwrap_or(&Value::Null),
        ));
        let background_url = Self::parse_background(&decode_maybe_nested(
            data.get("bg_image").unwrap_or(&Value::Null),
        ));
        let captions = Self::parse_captions(&decode_maybe_nested(
            data.get("text_cap").unwrap_or(&Value::Null),
        ));
        let timings = Self::parse_timings(&decode_maybe_nested(
            data.get("text_timelines").unwrap_or(&Value::Null),
        ));

        debug!(
            "Normalized payload: {} images, {} audios, {} captions, {} timings",
            images.len(),
            audios.len(),
            captions.len(),
            timings.len()
        );

        Ok(DraftPayload {
            images,
            audios,
            background_url,
            captions,
            timings,
            topic: field_str(&data, "topic"),
            hook_type: field_str(&data, "hook_type"),
            output_language: field_str(&data, "output_language"),
        })
    }

    fn parse_images(list: &Value) -> Vec<ImageItem> {
        list.as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| ImageItem {
                        image_url: field_str(item, "image_url"),
                        start_us: field_us(item, "start"),
                        end_us: field_us(item, "end"),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_audios(list: &Value) -> Vec<AudioItem> {
        list.as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| AudioItem {
                        audio_url: field_str(item, "audio_url"),
                        start_us: field_us(item, "start"),
                        end_us: field_us(item, "end"),
                        duration_us: field_us(item, "duration"),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    // First entry's image_url is the document-level background fallback
    fn parse_background(list: &Value) -> Option<String> {
        let first = list.as_array()?.first()?;
        let url = field_str(first, "image_url");
        if url.is_empty() { None } else { Some(url) }
    }

    // Non-string entries become empty strings so that positions stay aligned
    // with the timing list
    fn parse_captions(list: &Value) -> Vec<String> {
        list.as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_timings(list: &Value) -> Vec<TimingEntry> {
        list.as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| TimingEntry {
                        start_us: field_us(item, "start"),
                        end_us: field_us(item, "end"),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
