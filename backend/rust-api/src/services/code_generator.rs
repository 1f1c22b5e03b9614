use rand::Rng;

/// Uppercase alphanumerics with the easily-confused glyphs removed
/// (no 0/O, 1/I/L), so codes survive being read aloud or typed from a
/// projector.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Collision retries before the store gives up with CodeSpaceExhausted.
/// With a 31-char alphabet and 5-char codes (~28.6M combinations) a retry
/// is already rare at thousands of concurrent sessions.
pub const MAX_CODE_ATTEMPTS: usize = 32;

/// Produces one candidate join code. Uniqueness against live sessions is
/// the store's job; this is just the alphabet and shape.
pub fn new_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET[idx])
        })
        .collect()
}
