use rand::Rng;

/// Length of every generated short code.
pub const CODE_LENGTH: usize = 6;

/// Characters a generated code is drawn from.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Draw a `CODE_LENGTH`-character code, each character uniform over `ALPHABET`.
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
