/// Password hashing with Argon2id
///
/// Parameters: 64 MB memory, 3 passes, 4 lanes, 32-byte output, random
/// 16-byte salt. Hashes are stored as PHC strings, which embed the
/// parameters, so verification keeps working if they change later.
///
/// # Example
///
/// ```
/// use cofound_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery")?;
/// assert!(verify_password("correct horse battery", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest password accepted at registration
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes `password` into a PHC string (`$argon2id$v=19$m=65536,t=3,p=4$...`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC hash
///
/// Argon2's verifier compares in constant time. A wrong password is
/// `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    if parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash("Hash has no output segment".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Registration password policy: length bounds and not blank
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if len > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LENGTH
        ));
    }

    if password.trim().is_empty() {
        return Err("Password must not be blank".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("plaintext-secret").expect("Hash should succeed");
        assert!(!hash.contains("plaintext-secret"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").expect("Hash 1 should succeed");
        let hash2 = hash_password("same_password").expect("Hash 2 should succeed");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").expect("Hash should succeed");

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash").is_err());
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_unicode_password_roundtrip() {
        let hash = hash_password("mot-de-passe-密码").expect("Hash should succeed");
        assert!(verify_password("mot-de-passe-密码", &hash).unwrap());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").unwrap_err().contains("at least 8"));
        assert!(validate_password(&"x".repeat(129)).unwrap_err().contains("at most 128"));
        assert!(validate_password("          ").unwrap_err().contains("blank"));
    }
}
