//! Integration tests for message-name import and export

#![allow(clippy::expect_used, clippy::unwrap_used)]

use packet_lens::{AnalyzerError, Profile, ProfileRegistry};
use std::fs;

fn registry() -> ProfileRegistry {
    ProfileRegistry::with_profiles(
        [
            Profile::new("game", "Eeo1hSnvNVW9DoLr", "FGuuBlp66dtu3M6l", 20),
            Profile::new("other", "Eeo1hSnvNVW9DoLr", "FGuuBlp66dtu3M6l", 8),
        ],
        Some("game"),
    )
    .unwrap()
}

#[test]
fn test_import_file_skips_bad_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.json");
    fs::write(
        &path,
        r#"{ "30000": "heartbeat", "1001": "login", "abc": "skipped", "-1": "skipped" }"#,
    )
    .unwrap();

    let registry = registry();
    assert_eq!(registry.import_message_names_file(&path).unwrap(), 2);
    assert_eq!(registry.message_name(30000).as_deref(), Some("heartbeat"));
    assert_eq!(registry.message_name(1001).as_deref(), Some("login"));

    // only the current profile is touched
    assert!(registry.get("other").unwrap().message_names.is_empty());
}

#[test]
fn test_export_then_import_into_another_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");

    let registry = registry();
    registry.set_message_name(2, "two").unwrap();
    registry.set_message_name(10, "ten").unwrap();
    assert_eq!(registry.export_message_names_file(&path).unwrap(), 2);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.find("\"2\"").unwrap() < text.find("\"10\"").unwrap());

    registry.select("other").unwrap();
    assert_eq!(registry.import_message_names_file(&path).unwrap(), 2);
    assert_eq!(registry.message_name(10).as_deref(), Some("ten"));
}

#[test]
fn test_import_requires_selection() {
    let registry = ProfileRegistry::new();
    let err = registry
        .import_message_names(&b"{\"1\": \"a\"}"[..])
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::NoProfileSelected));

    let mut sink = Vec::new();
    assert!(matches!(
        registry.export_message_names(&mut sink),
        Err(AnalyzerError::NoProfileSelected)
    ));
}

#[test]
fn test_import_missing_file_and_bad_json() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        registry.import_message_names_file(dir.path().join("missing.json")),
        Err(AnalyzerError::Io(_))
    ));
    assert!(matches!(
        registry.import_message_names(&b"[1, 2]"[..]),
        Err(AnalyzerError::Json(_))
    ));
}
