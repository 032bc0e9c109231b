//! Password hashing (Argon2id, PHC string format)

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use tokio::sync::OnceCell;

use crate::error::AppError;

/// Stand-in hash checked when no member matches, hashed once per process
static UNKNOWN_MEMBER_HASH: OnceCell<String> = OnceCell::const_new();

/// Hash a password on the blocking pool
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
    .map_err(AppError::Internal)
}

/// Check a password against a stored PHC string
///
/// A malformed stored hash is an internal error, not a mismatch.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {e}"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
    .map_err(AppError::Internal)
}

/// Burn one verification against a throwaway hash; always `false`
///
/// Login calls this for unknown usernames so they cost the same Argon2
/// work as a wrong password for a real member.
pub async fn verify_unknown_member(password: String) -> Result<bool, AppError> {
    let stand_in = UNKNOWN_MEMBER_HASH
        .get_or_try_init(|| hash_password("gatorshare-unknown-member".to_string()))
        .await?;
    verify_password(password, stand_in.clone()).await?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("correct horse".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(
            verify_password("correct horse".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !verify_password("wrong horse".to_string(), hash)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let first = hash_password("password123".to_string()).await.unwrap();
        let second = hash_password("password123".to_string()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let result = verify_password("anything".to_string(), "not-a-hash".to_string()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn unknown_member_never_verifies() {
        for password in ["gatorshare-unknown-member", "chomp-chomp", ""] {
            assert!(!verify_unknown_member(password.to_string()).await.unwrap());
        }
        let stand_in = UNKNOWN_MEMBER_HASH.get().unwrap();
        assert!(stand_in.starts_with("$argon2id$"));
    }
}
