//! Authentication for the admin service
//!
//! Provides:
//! - JWT token generation and validation for the admin session
//! - Password hashing with Argon2 for registered users

pub mod jwt;
pub mod password;

pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenInput, TokenValidationResult};
pub use password::hash_password;
