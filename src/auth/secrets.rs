use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// AES-256-GCM nonce size (96 bits, per NIST recommendation).
const NONCE_SIZE: usize = 12;
/// GCM authentication tag size.
const TAG_SIZE: usize = 16;
const VERIFICATION_TOKEN_BYTES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("malformed ciphertext blob")]
    Malformed,
    #[error("ciphertext failed authentication")]
    Decryption,
    #[error("encryption failed")]
    Encryption,
}

/// Reversible at-rest encryption for email addresses. Stored form is
/// `base64(nonce || ciphertext || tag)` with a fresh random nonce per
/// call, so equal plaintexts never produce equal blobs.
#[derive(Clone)]
pub struct EmailCipher {
    cipher: Aes256Gcm,
}

impl EmailCipher {
    /// The key must decode to exactly 32 bytes; anything else is a
    /// startup misconfiguration and aborts boot.
    pub fn from_hex_key(hex_key: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|_| anyhow::anyhow!("EMAIL_ENC_KEY is not valid hex"))?;
        anyhow::ensure!(
            bytes.len() == 32,
            "EMAIL_ENC_KEY must decode to 32 bytes, got {}",
            bytes.len()
        );
        let key = Key::<Aes256Gcm>::from_slice(&bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encryption)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(blob))
    }

    /// Authenticate-then-decrypt: a truncated, tampered, or wrong-key
    /// blob fails; garbage is never returned.
    pub fn decrypt(&self, blob: &str) -> Result<String, CipherError> {
        let bytes = general_purpose::STANDARD
            .decode(blob)
            .map_err(|_| CipherError::Malformed)?;
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CipherError::Malformed);
        }

        let nonce = Nonce::from_slice(&bytes[..NONCE_SIZE]);
        let plaintext = self
            .cipher
            .decrypt(nonce, &bytes[NONCE_SIZE..])
            .map_err(|_| CipherError::Decryption)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::Decryption)
    }
}

/// Deterministic digest of the normalized address. Uniqueness and lookup
/// key for a column whose stored form is randomized ciphertext; never
/// reversed.
pub fn email_fingerprint(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

/// Single-use token embedded in the verification link.
pub fn generate_verification_token() -> String {
    let mut bytes = [0u8; VERIFICATION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "6368616e676520746869732070617373776f726420746f206120736563726574";

    fn cipher() -> EmailCipher {
        EmailCipher::from_hex_key(KEY).expect("test key")
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let cipher = cipher();
        let blob = cipher.encrypt("alice@example.com").expect("encrypt");
        assert_eq!(cipher.decrypt(&blob).expect("decrypt"), "alice@example.com");
    }

    #[test]
    fn equal_plaintexts_produce_different_blobs() {
        let cipher = cipher();
        let first = cipher.encrypt("alice@example.com").expect("encrypt");
        let second = cipher.encrypt("alice@example.com").expect("encrypt");
        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first).unwrap(), cipher.decrypt(&second).unwrap());
    }

    #[test]
    fn tampered_blob_is_rejected() {
        let cipher = cipher();
        let blob = cipher.encrypt("alice@example.com").expect("encrypt");
        let mut bytes = general_purpose::STANDARD.decode(&blob).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let tampered = general_purpose::STANDARD.encode(bytes);
        assert!(matches!(cipher.decrypt(&tampered), Err(CipherError::Decryption)));
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let cipher = cipher();
        assert!(matches!(cipher.decrypt("YWJj"), Err(CipherError::Malformed)));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let cipher = cipher();
        assert!(matches!(cipher.decrypt("%%%not-base64%%%"), Err(CipherError::Malformed)));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let blob = cipher().encrypt("alice@example.com").expect("encrypt");
        let other = EmailCipher::from_hex_key(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        )
        .expect("other key");
        assert!(matches!(other.decrypt(&blob), Err(CipherError::Decryption)));
    }

    #[test]
    fn short_or_invalid_keys_are_fatal() {
        assert!(EmailCipher::from_hex_key("aabbcc").is_err());
        assert!(EmailCipher::from_hex_key("not hex at all").is_err());
    }

    #[test]
    fn fingerprint_is_deterministic_and_normalized() {
        assert_eq!(
            email_fingerprint(" Alice@Example.COM "),
            email_fingerprint("alice@example.com")
        );
        assert_ne!(
            email_fingerprint("alice@example.com"),
            email_fingerprint("bob@example.com")
        );
        assert_eq!(email_fingerprint("alice@example.com").len(), 64);
    }

    #[test]
    fn verification_tokens_are_random_hex() {
        let first = generate_verification_token();
        let second = generate_verification_token();
        assert_eq!(first.len(), 40);
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
