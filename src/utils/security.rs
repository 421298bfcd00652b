//! Security Utilities
//!
//! Credential generation and other security-related helpers.

use rand::{seq::SliceRandom, Rng};

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

/// Symbols accepted by the directory's credential policy
pub const CREDENTIAL_SYMBOLS: &[u8] = b"!@#$%^&*()-_+=";

/// Length of generated one-time credentials
pub const CREDENTIAL_LENGTH: usize = 12;

/// Generate a one-time temporary credential for account provisioning.
///
/// The credential satisfies the directory's complexity policy: minimum
/// length 12 with at least one uppercase letter, one lowercase letter,
/// one digit and one symbol. Repeated characters are allowed. The value
/// is never surfaced to the user; sign-in is link-based.
pub fn generate_temp_credential() -> String {
    let mut rng = rand::thread_rng();

    let mut chars: Vec<u8> = vec![
        UPPERCASE[rng.gen_range(0..UPPERCASE.len())],
        LOWERCASE[rng.gen_range(0..LOWERCASE.len())],
        DIGITS[rng.gen_range(0..DIGITS.len())],
        CREDENTIAL_SYMBOLS[rng.gen_range(0..CREDENTIAL_SYMBOLS.len())],
    ];

    let pool: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, CREDENTIAL_SYMBOLS].concat();
    while chars.len() < CREDENTIAL_LENGTH {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

/// Timing-safe string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.bytes().zip(b.bytes()) {
        result |= byte_a ^ byte_b;
    }
    result == 0
}
