use rand::Rng;

const BASE62: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A cryptographically random base62 string of `len` characters, used for
/// both the setup/create tokens (24 chars, §3) and the daemon API key
/// (64 chars, §4.I Create).
#[must_use]
pub fn random_base62(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE62[rng.gen_range(0..BASE62.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_length() {
        assert_eq!(random_base62(24).len(), 24);
        assert_eq!(random_base62(64).len(), 64);
    }

    #[test]
    fn only_contains_base62_characters() {
        let token = random_base62(256);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn two_calls_are_not_equal() {
        // Not a statistical proof, just a sanity check the RNG is actually used.
        assert_ne!(random_base62(24), random_base62(24));
    }
}
