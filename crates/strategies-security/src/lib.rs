//! # Strategies Security
//!
//! Token and credential helpers shared by the demo identity handlers.

pub mod password;
pub mod token;

pub use password::validate_password_strength;
pub use token::{generate_secure_token, hash_token, session_id_for};
