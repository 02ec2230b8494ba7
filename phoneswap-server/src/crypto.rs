//! Password hashing and login salts

/// Default bcrypt cost factor
pub const BCRYPT_COST: u32 = 12;

/// Minimum accepted password length (before marker stripping)
pub const PASSWORD_MIN: usize = 8;

/// Maximum accepted password length
pub const PASSWORD_MAX: usize = 80;

/// Hash a password with bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Verify a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

/// Generate a per-login salt so no two issued credentials are identical
pub fn generate_login_salt() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_login_salt_uniqueness() {
        let s1 = generate_login_salt();
        let s2 = generate_login_salt();
        assert_ne!(s1, s2);
    }
}
