//! Password hashing for registration. Login itself is OTP based, so the
//! stored hash is only checked by administrative tooling, but registration
//! still refuses to persist plaintext.

use crate::config;

/// Hash a password with the configured bcrypt work factor.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
}

/// Verify a password against a stored bcrypt hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, stored_hash)
}
