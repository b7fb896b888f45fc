//! Password hashing for the login dialog's password step. The
//! `hash_password` config flag toggles between argon2 and byte-equality
//! for environments that seed a plaintext password table.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

fn salt() -> SaltString {
    use rand::Rng;
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    SaltString::encode_b64(&bytes).expect("salt")
}

pub fn hash(password: &str) -> String {
    Argon2::default().hash_password(password.as_bytes(), &salt()).expect("hash password").to_string()
}

pub fn verify(password: &str, hashed: &str) -> bool {
    PasswordHash::new(hashed)
        .ok()
        .as_ref()
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), parsed).is_ok())
        .unwrap_or(false)
}

/// Stores or checks a password according to `hash_password`: argon2 when
/// enabled, plain byte-equality otherwise (for test fixtures and
/// environments that seed a plaintext password table).
pub fn store(password: &str, hash_password: bool) -> String {
    if hash_password {
        hash(password)
    } else {
        password.to_string()
    }
}

pub fn matches(password: &str, stored: &str, hash_password: bool) -> bool {
    if hash_password {
        verify(password, stored)
    } else {
        password == stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_hashed_password_verifies_only_against_itself() {
        let hashed = hash("correct horse");
        assert!(verify("correct horse", &hashed));
        assert!(!verify("wrong", &hashed));
    }

    #[test]
    fn plain_mode_compares_bytes_directly() {
        let stored = store("hunter2", false);
        assert_eq!(stored, "hunter2");
        assert!(matches("hunter2", &stored, false));
        assert!(!matches("other", &stored, false));
    }
}
