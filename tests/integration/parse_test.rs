//! Subtitle file loading against the checked-in fixtures

use srtp::subtitle::{
    decode_with_fallback, format_timecode, parse_bytes, parse_timecode, DEFAULT_ENCODINGS,
};
use srtp::{parse_file, SubtitleError};

use crate::helpers::{fixtures_dir, temp_fixture, write_file};

#[test]
fn basic_fixture_parses_all_blocks() {
    let entries = parse_file(&fixtures_dir().join("basic.srt"), DEFAULT_ENCODINGS).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].id, "1");
    assert_eq!(entries[0].start, 1.0);
    assert_eq!(entries[0].end, 3.0);
    assert_eq!(entries[0].text, "Hello");
    assert_eq!(entries[1].text, "Second line\nspans two rows");
    assert_eq!(entries[1].end, 6.5);
    assert_eq!(entries[2].start, 8.25);
}

#[test]
fn crlf_fixture_matches_lf_parse() {
    let (_dir, path) = temp_fixture("crlf.srt");
    let entries = parse_file(&path, DEFAULT_ENCODINGS).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Windows");
    assert_eq!(entries[1].text, "Line endings");
    assert!(entries.iter().all(|e| !e.text.contains('\r')));
}

#[test]
fn malformed_blocks_are_skipped() {
    let entries = parse_file(&fixtures_dir().join("malformed.srt"), DEFAULT_ENCODINGS).unwrap();

    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
    assert_eq!(entries[1].text, "Also valid");
}

#[test]
fn entries_are_sorted_by_start_keeping_file_order_for_ties() {
    let entries = parse_file(&fixtures_dir().join("unordered.srt"), DEFAULT_ENCODINGS).unwrap();

    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "b"]);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.srt");

    let err = parse_file(&path, DEFAULT_ENCODINGS).unwrap_err();
    assert!(matches!(err, SubtitleError::NotFound { path: p } if p == path));
}

#[test]
fn shift_jis_file_falls_back() {
    let document = "1\n00:00:01,000 --> 00:00:02,000\nこんにちは\n";
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(document);
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "jp.srt", &bytes[..]);

    let entries = parse_file(&path, DEFAULT_ENCODINGS).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "こんにちは");
}

#[test]
fn latin1_text_falls_through_to_windows_1252() {
    let bytes = b"1\n00:00:01,000 --> 00:00:02,000\ncaf\xE9 au lait\n";

    let decoded = decode_with_fallback(bytes, DEFAULT_ENCODINGS).unwrap();
    assert_eq!(decoded.encoding, "windows-1252");

    let entries = parse_bytes(bytes, DEFAULT_ENCODINGS).unwrap();
    assert_eq!(entries[0].text, "café au lait");
}

#[test]
fn undecodable_bytes_report_every_encoding_tried() {
    let bytes = b"1\n00:00:01,000 --> 00:00:02,000\n\xFF\xFE\xFD\n";

    let err = parse_bytes(bytes, &["utf-8"]).unwrap_err();
    match err {
        SubtitleError::Encoding { tried } => assert_eq!(tried, vec!["utf-8".to_string()]),
        other => panic!("expected encoding error, got {other:?}"),
    }
}

#[test]
fn formatted_timecodes_parse_back_to_the_millisecond() {
    for seconds in [0.0, 1.0, 8.25, 59.999, 3723.5, 86_399.001] {
        let text = format_timecode(seconds);
        let parsed = parse_timecode(&text).unwrap();
        assert!((parsed - seconds).abs() < 0.0005, "{seconds} -> {text} -> {parsed}");
    }
}
