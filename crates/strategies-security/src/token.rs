use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Length of the short session identifier derived from a token hash.
pub const SESSION_ID_LEN: usize = 16;

/// Generates an opaque URL-safe token from `length` random bytes.
///
/// The token is base64 (URL alphabet, no padding), so 32 bytes yield 43 characters.
pub fn generate_secure_token(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hashes a token with BLAKE3 and returns the hex digest.
pub fn hash_token(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

/// Short, stable identifier for the session a token belongs to.
///
/// Listing endpoints expose this instead of the token itself.
pub fn session_id_for(token: &str) -> String {
    let mut digest = hash_token(token);
    digest.truncate(SESSION_ID_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = generate_secure_token(32);
        let b = generate_secure_token(32);

        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_hash_is_stable() {
        let digest = hash_token("demo-token");
        assert_eq!(digest, hash_token("demo-token"));
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, hash_token("other-token"));
    }

    #[test]
    fn test_session_id_is_hash_prefix() {
        let id = session_id_for("demo-token");
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert!(hash_token("demo-token").starts_with(&id));
    }
}
