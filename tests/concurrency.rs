//! Concurrent access to one analyzer: parses read the registry while other
//! threads mutate it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use packet_lens::{Analyzer, CipherEngine, Profile};
use std::sync::Arc;
use tokio::task::JoinSet;

const KEY: &str = "0123456789abcdef";
const IV: &str = "fedcba9876543210";

fn frame(message_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut raw = Vec::new();
    raw.extend_from_slice(&((20 + payload.len()) as u32).to_be_bytes());
    raw.extend_from_slice(&message_id.to_be_bytes());
    raw.extend_from_slice(&[0u8; 12]);
    raw.extend_from_slice(payload);
    raw
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_parse_and_rename() {
    let analyzer = Arc::new(Analyzer::new());
    analyzer
        .registry()
        .register(Profile::new("game", KEY, IV, 20))
        .unwrap();
    analyzer.registry().select("game").unwrap();

    let ciphertext = CipherEngine::new(KEY, IV)
        .unwrap()
        .encrypt(&[0x08, 0x96, 0x01])
        .unwrap();
    let mut stream = Vec::new();
    for id in 0..16u32 {
        stream.extend(frame(id, &ciphertext));
    }
    let stream = Arc::new(stream);

    let mut tasks = JoinSet::new();

    for _ in 0..6 {
        let analyzer = analyzer.clone();
        let stream = stream.clone();
        tasks.spawn_blocking(move || {
            for _ in 0..200 {
                let packets = analyzer.parse_stream(&stream).unwrap();
                assert_eq!(packets.len(), 16);
                for (id, packet) in packets.iter().enumerate() {
                    assert!(packet.is_ok());
                    assert!(packet.structure.is_some());
                    // A name is either the placeholder or a full write, never torn
                    let name = &packet.header.message_name;
                    assert!(
                        name == &format!("unknown message({id})") || name == &format!("msg-{id}"),
                        "unexpected label {name}"
                    );
                }
            }
        });
    }

    for writer in 0..2u32 {
        let analyzer = analyzer.clone();
        tasks.spawn_blocking(move || {
            for id in (writer..16).step_by(2) {
                analyzer
                    .registry()
                    .set_message_name(id, format!("msg-{id}"))
                    .unwrap();
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.expect("task panicked");
    }

    for id in 0..16 {
        assert_eq!(
            analyzer.registry().message_name(id),
            Some(format!("msg-{id}"))
        );
    }
    assert_eq!(analyzer.metrics().snapshot().packets_parsed, 6 * 200 * 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_register_and_select() {
    let analyzer = Arc::new(Analyzer::new());
    let mut tasks = JoinSet::new();

    for i in 0..8 {
        let analyzer = analyzer.clone();
        tasks.spawn_blocking(move || {
            let name = format!("profile-{i}");
            analyzer
                .registry()
                .register(Profile::new(&name, KEY, IV, 20))
                .unwrap();
            analyzer.registry().select(&name).unwrap();
            let current = analyzer.registry().current().expect("a profile is selected");
            assert!(current.name.starts_with("profile-"));
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.expect("task panicked");
    }

    assert_eq!(analyzer.registry().len(), 8);
    assert!(analyzer.registry().current_name().is_some());
}
