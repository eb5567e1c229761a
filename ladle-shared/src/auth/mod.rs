/// Authentication utilities
///
/// - `password`: Argon2id password hashing and verification
/// - `jwt`: Bearer token creation and validation

pub mod jwt;
pub mod password;
