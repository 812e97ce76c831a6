#![no_main]

use libfuzzer_sys::fuzz_target;
use packet_lens::utils::crypto::{pkcs7_unpad, CipherEngine};

fuzz_target!(|data: &[u8]| {
    // Fuzz decryption with arbitrary ciphertext and lenient unpadding
    let engine = match CipherEngine::new("Eeo1hSnvNVW9DoLr", "FGuuBlp66dtu3M6l") {
        Ok(engine) => engine,
        Err(_) => return,
    };
    let _ = engine.decrypt(data);
    let _ = pkcs7_unpad(data);

    if let Ok(ciphertext) = engine.encrypt(data) {
        assert_eq!(engine.decrypt(&ciphertext).ok().as_deref(), Some(data));
    }
});
