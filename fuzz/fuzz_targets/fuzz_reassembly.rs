#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use packet_lens::{Analyzer, FrameCodec, Profile};
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let analyzer = Analyzer::new();
    let _ = analyzer
        .registry()
        .register(Profile::new("fuzz", "Eeo1hSnvNVW9DoLr", "FGuuBlp66dtu3M6l", 20));
    let _ = analyzer.registry().select("fuzz");

    // Offline reassembly must never fail on arbitrary bytes once a valid profile is selected
    let _ = analyzer.parse_stream(data);

    // Live codec must not panic or buffer past its limit
    let mut codec = FrameCodec::new(4096);
    let mut buf = BytesMut::from(data);
    while let Ok(Some(frame)) = codec.decode(&mut buf) {
        let _ = analyzer.parse_packet(&frame);
    }
});
