#![no_main]

use libfuzzer_sys::fuzz_target;
use packet_lens::WireIntrospector;

fuzz_target!(|data: &[u8]| {
    // Fuzz schema-less decoding - test for panics, stack exhaustion, runaway recursion
    let message = WireIntrospector::default().decode(data, 0);
    let _ = message.render();

    if let Some((&skip, rest)) = data.split_first() {
        let _ = WireIntrospector::new(4).decode(rest, usize::from(skip));
    }
});
