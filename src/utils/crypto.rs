//! # Payload Cipher
//!
//! AES-CBC with PKCS7 padding, keyed from a [`Profile`].
//!
//! Key and IV material is stored on profiles as strings, because captured
//! clients ship them either as hex or as literal ASCII. Resolution rule: if
//! the string hex-decodes to exactly one block (16 bytes) the decoded bytes
//! are used, otherwise the raw bytes of the string are used. The resolved
//! key selects AES-128, AES-192 or AES-256 by its length.
//!
//! ## Padding policy
//! Decryption strips PKCS7 padding only when it is well formed. Malformed
//! padding is *not* an error: the full decrypted buffer is returned as-is so
//! an analyst still sees the plaintext of a frame whose tail is damaged or
//! unpadded.

use crate::error::{constants, AnalyzerError, Result};
use crate::profile::Profile;
use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::debug;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Accepted AES key lengths in bytes
pub const KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Resolve key or IV material to bytes.
///
/// ```rust
/// use packet_lens::utils::crypto::resolve_material;
/// // 32 hex digits decode to one block
/// assert_eq!(resolve_material("000102030405060708090a0b0c0d0e0f").len(), 16);
/// // anything else is taken literally
/// assert_eq!(resolve_material("Eeo1hSnvNVW9DoLr"), b"Eeo1hSnvNVW9DoLr".to_vec());
/// ```
pub fn resolve_material(material: &str) -> Vec<u8> {
    match hex::decode(material) {
        Ok(decoded) if decoded.len() == BLOCK_SIZE => decoded,
        _ => material.as_bytes().to_vec(),
    }
}

/// Append PKCS7 padding: between 1 and `BLOCK_SIZE` bytes, each holding the pad length.
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.resize(data.len() + pad, pad as u8);
    out
}

/// Strip PKCS7 padding, failing if the trailing bytes are not a valid pad.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8]> {
    let Some(&last) = data.last() else {
        return Err(AnalyzerError::InvalidPkcs7Padding);
    };
    let pad = last as usize;
    if pad == 0 || pad > BLOCK_SIZE || pad > data.len() {
        return Err(AnalyzerError::InvalidPkcs7Padding);
    }
    let (body, tail) = data.split_at(data.len() - pad);
    if tail.iter().any(|&b| b != last) {
        return Err(AnalyzerError::InvalidPkcs7Padding);
    }
    Ok(body)
}

/// AES-CBC cipher bound to one profile's resolved key and IV.
#[derive(Clone)]
pub struct CipherEngine {
    key: Vec<u8>,
    iv: [u8; BLOCK_SIZE],
}

impl std::fmt::Debug for CipherEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherEngine")
            .field("key_len", &self.key.len())
            .finish_non_exhaustive()
    }
}

impl CipherEngine {
    /// Resolve and validate raw key/IV material.
    ///
    /// # Errors
    /// `InvalidKeyLength` unless the key resolves to 16, 24 or 32 bytes;
    /// `InvalidIvLength` unless the IV resolves to 16 bytes.
    pub fn new(key_material: &str, iv_material: &str) -> Result<Self> {
        let key = resolve_material(key_material);
        let iv = resolve_material(iv_material);

        if !KEY_LENGTHS.contains(&key.len()) {
            return Err(AnalyzerError::InvalidKeyLength(key.len()));
        }
        let iv: [u8; BLOCK_SIZE] = iv
            .as_slice()
            .try_into()
            .map_err(|_| AnalyzerError::InvalidIvLength(iv.len()))?;

        Ok(Self { key, iv })
    }

    pub fn from_profile(profile: &Profile) -> Result<Self> {
        Self::new(&profile.key_material, &profile.iv_material)
    }

    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    /// Decrypt a CBC ciphertext and strip its padding leniently.
    ///
    /// # Errors
    /// `EmptyCiphertext` for zero-length input, `InvalidCiphertextLength`
    /// when the length is not a multiple of the block size.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() {
            return Err(AnalyzerError::EmptyCiphertext);
        }
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(AnalyzerError::InvalidCiphertextLength(ciphertext.len()));
        }

        let mut buf = ciphertext.to_vec();
        self.cbc_decrypt(&mut buf)?;

        match pkcs7_unpad(&buf) {
            Ok(body) => {
                let len = body.len();
                buf.truncate(len);
            }
            Err(_) => {
                debug!(
                    len = buf.len(),
                    "{}; returning unpadded plaintext",
                    constants::ERR_INVALID_PADDING
                );
            }
        }
        Ok(buf)
    }

    /// PKCS7-pad and CBC-encrypt. Any plaintext length is accepted.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut buf = pkcs7_pad(plaintext);
        self.cbc_encrypt(&mut buf)?;
        Ok(buf)
    }

    fn cbc_decrypt(&self, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        let bad_len = |_| AnalyzerError::InvalidCiphertextLength(len);
        match self.key.len() {
            16 => cbc::Decryptor::<Aes128>::new_from_slices(&self.key, &self.iv)
                .map_err(|_| AnalyzerError::InvalidKeyLength(16))?
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ())
                .map_err(bad_len),
            24 => cbc::Decryptor::<Aes192>::new_from_slices(&self.key, &self.iv)
                .map_err(|_| AnalyzerError::InvalidKeyLength(24))?
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ())
                .map_err(bad_len),
            32 => cbc::Decryptor::<Aes256>::new_from_slices(&self.key, &self.iv)
                .map_err(|_| AnalyzerError::InvalidKeyLength(32))?
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ())
                .map_err(bad_len),
            other => Err(AnalyzerError::InvalidKeyLength(other)),
        }
    }

    fn cbc_encrypt(&self, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        let bad_len = |_| AnalyzerError::InvalidCiphertextLength(len);
        match self.key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(&self.key, &self.iv)
                .map_err(|_| AnalyzerError::InvalidKeyLength(16))?
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ())
                .map_err(bad_len),
            24 => cbc::Encryptor::<Aes192>::new_from_slices(&self.key, &self.iv)
                .map_err(|_| AnalyzerError::InvalidKeyLength(24))?
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ())
                .map_err(bad_len),
            32 => cbc::Encryptor::<Aes256>::new_from_slices(&self.key, &self.iv)
                .map_err(|_| AnalyzerError::InvalidKeyLength(32))?
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ())
                .map_err(bad_len),
            other => Err(AnalyzerError::InvalidKeyLength(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const KEY: &str = "Eeo1hSnvNVW9DoLr";
    const IV: &str = "FGuuBlp66dtu3M6l";

    #[test]
    fn test_resolve_hex_only_when_one_block() {
        assert_eq!(resolve_material("00112233445566778899aabbccddeeff").len(), 16);
        // 24 bytes of valid hex are NOT decoded: only a 16-byte decode counts
        let hex24 = "000102030405060708090a0b0c0d0e0f1011121314151617";
        assert_eq!(resolve_material(hex24), hex24.as_bytes());
        assert_eq!(resolve_material("zz"), b"zz");
    }

    #[test]
    fn test_key_and_iv_validation() {
        assert!(matches!(
            CipherEngine::new("short", IV),
            Err(AnalyzerError::InvalidKeyLength(5))
        ));
        assert!(matches!(
            CipherEngine::new(KEY, "iv"),
            Err(AnalyzerError::InvalidIvLength(2))
        ));
        assert_eq!(CipherEngine::new(&"k".repeat(24), IV).unwrap().key_len(), 24);
        assert_eq!(CipherEngine::new(&"k".repeat(32), IV).unwrap().key_len(), 32);
    }

    #[test]
    fn test_decrypt_rejects_bad_shapes() {
        let engine = CipherEngine::new(KEY, IV).unwrap();
        assert!(matches!(engine.decrypt(&[]), Err(AnalyzerError::EmptyCiphertext)));
        assert!(matches!(
            engine.decrypt(&[0u8; 17]),
            Err(AnalyzerError::InvalidCiphertextLength(17))
        ));
    }

    #[test]
    fn test_known_answer_aes128_cbc() {
        // NIST SP 800-38A F.2.1, first block
        let engine = CipherEngine::new(
            "2b7e151628aed2a6abf7158809cf4f3c",
            "000102030405060708090a0b0c0d0e0f",
        )
        .unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let ciphertext = hex::decode("7649abac8119b246cee98e9b12e9197d").unwrap();

        let mut buf = plaintext.clone();
        engine.cbc_encrypt(&mut buf).unwrap();
        assert_eq!(buf, ciphertext);
        // no valid pad on this block, so the lenient path returns it whole
        assert_eq!(engine.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_roundtrip_empty_plaintext() {
        let engine = CipherEngine::new(KEY, IV).unwrap();
        let ct = engine.encrypt(&[]).unwrap();
        assert_eq!(ct.len(), BLOCK_SIZE);
        assert_eq!(engine.decrypt(&ct).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_pad_lengths() {
        assert_eq!(pkcs7_pad(&[]).len(), 16);
        assert_eq!(pkcs7_pad(&[1; 15]), [vec![1; 15], vec![1]].concat());
        assert_eq!(pkcs7_pad(&[0; 16]).len(), 32);
    }

    #[test]
    fn test_unpad_rejections() {
        assert!(pkcs7_unpad(&[]).is_err());
        assert!(pkcs7_unpad(&[1, 2, 0]).is_err());
        assert!(pkcs7_unpad(&[17; 32]).is_err());
        assert!(pkcs7_unpad(&[1, 3, 2, 3]).is_err());
        assert!(pkcs7_unpad(&[4, 4, 4]).is_err());
        assert_eq!(pkcs7_unpad(&[9, 2, 2]).unwrap(), &[9]);
    }
}
