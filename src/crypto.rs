//! Transport envelope decryption
//!
//! Clients send feature payloads AES-256-CBC encrypted against a shared
//! key/IV pair, base64 wrapped. Key material is injected via `Config` so it
//! can be rotated per deployment.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::AppError;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const BLOCK_SIZE: usize = 16;

#[derive(Clone)]
pub struct CipherCodec {
    key: [u8; 32],
    iv: [u8; 16],
}

impl CipherCodec {
    pub fn new(key: &[u8], iv: &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            key: key
                .try_into()
                .map_err(|_| anyhow::anyhow!("cipher key must be 32 bytes"))?,
            iv: iv
                .try_into()
                .map_err(|_| anyhow::anyhow!("cipher IV must be 16 bytes"))?,
        })
    }

    /// Decrypt a base64 envelope into the JSON payload it carries.
    pub fn decrypt_envelope(&self, encrypted_b64: &str) -> Result<serde_json::Value, AppError> {
        let ciphertext = BASE64
            .decode(encrypted_b64.trim())
            .map_err(|e| AppError::DecodeError(e.to_string()))?;

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(AppError::DecodeError(format!(
                "ciphertext length {} is not a positive multiple of the block size",
                ciphertext.len()
            )));
        }

        let mut buf = ciphertext;
        let decryptor = Aes256CbcDec::new(&self.key.into(), &self.iv.into());
        let plaintext = decryptor
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|e| AppError::DecodeError(e.to_string()))?;

        let unpadded = strip_trailing_pad(plaintext);

        let text = std::str::from_utf8(unpadded)
            .map_err(|e| AppError::MalformedJson(e.to_string()))?;
        serde_json::from_str(text).map_err(|e| AppError::MalformedJson(e.to_string()))
    }
}

/// Strip trailing bytes in 0x00..=0x0F from the tail.
///
/// Deliberately permissive rather than strict PKCS#7: the deployed
/// encryption counterparts pad inconsistently and this is the rule they
/// were built against. Lossy if the final plaintext byte legitimately
/// falls in that range.
fn strip_trailing_pad(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && data[end - 1] <= 0x0F {
        end -= 1;
    }
    &data[..end]
}
