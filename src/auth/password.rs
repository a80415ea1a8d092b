//! Credential hashing.
//!
//! Digests are a single SHA-256 pass over the UTF-8 password bytes followed
//! by the raw salt bytes, encoded as lowercase hex. No stretching is applied;
//! the scheme is fixed by the stored credential format.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{ApiError, AuthError, StoreError};

pub const SALT_LENGTH: usize = 16;

/// Produces a fresh 16-byte salt from the OS random source.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH], ApiError> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.try_fill_bytes(&mut salt).map_err(|e| {
        tracing::error!(error = %e, "salt generation failed");
        ApiError::Auth(AuthError::Entropy)
    })?;
    Ok(salt)
}

/// Computes the stored digest for a password and salt.
pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    format!("{:x}", hasher.finalize())
}

/// Recomputes the digest and compares it against the stored one.
pub fn verify_password(password: &str, salt: &[u8], digest: &str) -> bool {
    hash_password(password, salt) == digest
}

/// Hex form of a salt, as persisted alongside the digest.
pub fn encode_salt(salt: &[u8]) -> String {
    salt.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decodes a persisted salt. A non-hex value means the record is corrupt.
pub fn decode_salt(hex: &str) -> Result<Vec<u8>, ApiError> {
    if hex.len() % 2 != 0 {
        return Err(ApiError::Store(StoreError::Integrity(
            "stored salt has odd length".to_string(),
        )));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                ApiError::Store(StoreError::Integrity(
                    "stored salt is not valid hex".to_string(),
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salts_are_sixteen_bytes_and_random() {
        let a = generate_salt().unwrap();
        let b = generate_salt().unwrap();
        assert_eq!(a.len(), SALT_LENGTH);
        assert_ne!(a, b);
    }

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        let salt = [7u8; SALT_LENGTH];
        let digest = hash_password("hunter2", &salt);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_is_deterministic_for_same_inputs() {
        let salt = generate_salt().unwrap();
        assert_eq!(hash_password("pw", &salt), hash_password("pw", &salt));
    }

    #[test]
    fn digest_depends_on_the_salt() {
        let digest = hash_password("hunter2", &[1u8; SALT_LENGTH]);
        assert_ne!(digest, hash_password("hunter2", &[2u8; SALT_LENGTH]));
        // Never the bare-password hash either.
        assert_ne!(digest, hash_password("hunter2", &[]));
    }

    #[test]
    fn digest_never_equals_the_plaintext() {
        let salt = generate_salt().unwrap();
        assert_ne!(hash_password("hunter2", &salt), "hunter2");
    }

    #[test]
    fn verify_accepts_the_right_password_only() {
        let salt = generate_salt().unwrap();
        let digest = hash_password("hunter2", &salt);
        assert!(verify_password("hunter2", &salt, &digest));
        assert!(!verify_password("hunter3", &salt, &digest));
    }

    #[test]
    fn salt_survives_a_hex_round_trip() {
        let salt = generate_salt().unwrap();
        let decoded = decode_salt(&encode_salt(&salt)).unwrap();
        assert_eq!(decoded, salt.to_vec());
    }

    #[test]
    fn decode_rejects_bad_hex() {
        assert!(decode_salt("abc").is_err());
        assert!(decode_salt("zz00").is_err());
    }
}
