/*!
 * Tests for payload decoding and time normalization
 */

use serde_json::{Value, json};

use coze2draft::input_normalizer::{DraftPayload, decode_maybe_nested, to_microseconds};

/// Wrap a JSON value in N successive layers of string encoding
fn wrap_n_times(value: &Value, n: usize) -> Value {
    let mut current = value.clone();
    for _ in 0..n {
        current = Value::String(serde_json::to_string(&current).unwrap());
    }
    current
}

/// Test nested decoding for various wrapping depths
#[test]
fn test_decode_maybe_nested_withRepeatedEncoding_shouldReturnInnermostContainer() {
    let inner = json!([{"image_url": "http://example.com/a.png", "start": 0}]);

    for n in 0..4 {
        let wrapped = wrap_n_times(&inner, n);
        assert_eq!(decode_maybe_nested(&wrapped), inner, "failed at depth {}", n);
    }
}

/// Test that objects pass through untouched
#[test]
fn test_decode_maybe_nested_withObject_shouldReturnObject() {
    let obj = json!({"start": 1, "end": 2});
    assert_eq!(decode_maybe_nested(&obj), obj);
}

/// Test that malformed encodings degrade to an empty array
#[test]
fn test_decode_maybe_nested_withMalformedInput_shouldReturnEmptyArray() {
    let empty = json!([]);

    assert_eq!(decode_maybe_nested(&json!("{not valid json")), empty);
    assert_eq!(decode_maybe_nested(&json!("[1, 2,")), empty);
    // A string that decodes to a bare scalar is not a container either
    assert_eq!(decode_maybe_nested(&json!("42")), empty);
    assert_eq!(decode_maybe_nested(&json!(null)), empty);
    assert_eq!(decode_maybe_nested(&json!(3.5)), empty);
}

/// Test that a malformed layer below a valid one still degrades to empty
#[test]
fn test_decode_maybe_nested_withMalformedInnerLayer_shouldReturnEmptyArray() {
    let wrapped = Value::String(serde_json::to_string(&json!("{broken")).unwrap());
    assert_eq!(decode_maybe_nested(&wrapped), json!([]));
}

/// Test microsecond normalization across accepted input shapes
#[test]
fn test_to_microseconds_withHeterogeneousInputs_shouldNormalize() {
    assert_eq!(to_microseconds(&json!(true), 0), 1);
    assert_eq!(to_microseconds(&json!(false), 0), 0);
    assert_eq!(to_microseconds(&json!(42), 0), 42);
    assert_eq!(to_microseconds(&json!(-7), 0), -7);
    assert_eq!(to_microseconds(&json!(12.5), 0), 13);
    assert_eq!(to_microseconds(&json!(12.4), 0), 12);
    assert_eq!(to_microseconds(&json!("12.5"), 0), 13);
    assert_eq!(to_microseconds(&json!(" 42 "), 0), 42);
    assert_eq!(to_microseconds(&json!("abc"), 0), 0);
    assert_eq!(to_microseconds(&json!(""), 7), 7);
    assert_eq!(to_microseconds(&json!("   "), 7), 7);
    assert_eq!(to_microseconds(&Value::Null, 9), 9);
    assert_eq!(to_microseconds(&json!([1, 2]), 9), 9);
    assert_eq!(to_microseconds(&json!({"a": 1}), 9), 9);
}

/// Test that normalization is idempotent on its own output
#[test]
fn test_to_microseconds_appliedTwice_shouldBeIdempotent() {
    for input in [json!(12.5), json!("12.5"), json!(true), json!("-3.7"), json!(100)] {
        let once = to_microseconds(&input, 0);
        let twice = to_microseconds(&json!(once), 0);
        assert_eq!(once, twice, "not idempotent for {:?}", input);
    }
}

/// Test parsing a full payload with nested-encoded lists
#[test]
fn test_payload_parse_withNestedEncodedLists_shouldNormalizeItems() {
    let image_list = serde_json::to_string(&json!([
        {"image_url": "http://example.com/a.png", "start": "0", "end": 3000000.0},
        {"start": 3000000, "end": 6000000}
    ]))
    .unwrap();

    let raw = json!({
        "image_list": image_list,
        "audio_list": [
            {"audio_url": "http://example.com/a.mp3", "start": 0, "duration": "2000000"}
        ],
        "bg_image": [{"image_url": "http://example.com/bg.png"}],
        "text_cap": ["hello", "world"],
        "text_timelines": [{"start": 0, "end": 1500000}],
        "topic": "  My Topic  ",
        "hook_type": "question",
        "output_language": "en"
    })
    .to_string();

    let payload = DraftPayload::parse(&raw).unwrap();

    assert_eq!(payload.images.len(), 2);
    assert_eq!(payload.images[0].image_url, "http://example.com/a.png");
    assert_eq!(payload.images[0].start_us, 0);
    assert_eq!(payload.images[0].end_us, 3000000);
    // Second item has no URL at all
    assert_eq!(payload.images[1].image_url, "");

    assert_eq!(payload.audios.len(), 1);
    assert_eq!(payload.audios[0].duration_us, 2000000);

    assert_eq!(
        payload.background_url.as_deref(),
        Some("http://example.com/bg.png")
    );
    assert_eq!(payload.captions, vec!["hello", "world"]);
    assert_eq!(payload.timings.len(), 1);
    assert_eq!(payload.topic, "My Topic");
}

/// Test that missing optional fields produce empty lists
#[test]
fn test_payload_parse_withMinimalObject_shouldDefaultEverything() {
    let payload = DraftPayload::parse("{}").unwrap();
    assert!(payload.images.is_empty());
    assert!(payload.audios.is_empty());
    assert!(payload.background_url.is_none());
    assert!(payload.captions.is_empty());
    assert!(payload.timings.is_empty());
    assert_eq!(payload.topic, "");
}

/// Test that a malformed image_list degrades to empty instead of failing
#[test]
fn test_payload_parse_withMalformedImageList_shouldYieldNoImages() {
    let raw = json!({"image_list": "{definitely not json"}).to_string();
    let payload = DraftPayload::parse(&raw).unwrap();
    assert!(payload.images.is_empty());
}

/// Test fatal behavior on unparsable or non-object top-level payloads
#[test]
fn test_payload_parse_withInvalidTopLevel_shouldFail() {
    assert!(DraftPayload::parse("not json at all").is_err());
    assert!(DraftPayload::parse("[1, 2, 3]").is_err());
    assert!(DraftPayload::parse("\"just a string\"").is_err());
}
