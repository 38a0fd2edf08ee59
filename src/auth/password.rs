use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

use crate::config::PasswordPolicyConfig;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Reason a candidate password was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordSyntaxError {
    #[error("Password must be at least {0} characters.")]
    TooShort(usize),
    #[error("Password contains unallowed characters.")]
    UnallowedCharacters,
    #[error("Password must contain letters and digits.")]
    NotStrong,
}

/// Checks a password against the panel policy. Length is counted in characters.
pub fn check_password_syntax(
    password: &str,
    policy: &PasswordPolicyConfig,
) -> Result<(), PasswordSyntaxError> {
    if password.chars().count() < policy.min_length {
        return Err(PasswordSyntaxError::TooShort(policy.min_length));
    }

    // printable ASCII, no space
    if !password.bytes().all(|b| (0x21..=0x7e).contains(&b)) {
        return Err(PasswordSyntaxError::UnallowedCharacters);
    }

    if policy.strong {
        let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !(has_letter && has_digit) {
            return Err(PasswordSyntaxError::NotStrong);
        }
    }

    Ok(())
}
