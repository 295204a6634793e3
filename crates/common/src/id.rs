//! ID and join-code generation utilities.

use rand::Rng;
use ulid::Ulid;
use uuid::Uuid;

/// Characters used in room join codes. Matches what a resident can type on
/// a phone keyboard without ambiguity handling: plain A-Z and 0-9.
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a new random UUID v4.
    #[must_use]
    pub fn generate_uuid_v4(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Generate a room join code of the given length.
    ///
    /// Codes are uppercase alphanumerics. Uniqueness among open rooms is
    /// NOT guaranteed here; callers must check the store and retry on
    /// collision.
    #[must_use]
    pub fn generate_join_code(&self, length: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..JOIN_CODE_ALPHABET.len());
                char::from(JOIN_CODE_ALPHABET[idx])
            })
            .collect()
    }
}

/// Normalize a join code for comparison: codes are case-insensitive and
/// stored uppercase.
#[must_use]
pub fn normalize_join_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
