///
/// FNV-1a 64-bit hash (compile-time safe).
///
/// - Deterministic across compilers and platforms.
/// - `const fn`-compatible.
/// - Not cryptographically secure — integrity only, never a MAC.
///
/// Reference: Fowler–Noll–Vo hash, FNV-1a variant (64-bit, prime = 0x100000001b3).
///
#[must_use]
#[allow(clippy::unreadable_literal)]
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    let mut i = 0;

    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }

    hash
}

/// Single avalanche pass over a 64-bit value: two multiplies, three xor-shifts.
///
/// This is the 64-bit finalizer from MurmurHash3, applied once. It is used to
/// spread the bits of the raw FNV-1a mix so that entries differing in a
/// single trailing byte do not produce hashes differing only in low bits.
#[must_use]
#[allow(clippy::unreadable_literal)]
pub const fn avalanche(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ceb9fe1a85ec53);
    h ^= h >> 33;
    h
}

/// Format a 64-bit hash as 16 uppercase hex characters.
#[must_use]
pub fn format_hash(h: u64) -> String {
    format!("{h:016X}")
}

/// Compute the canonical entry hash over a byte stream and format it.
///
/// Callers assemble the canonical byte stream per the type-specific encoding
/// rules (see `value::wire`) and pass the full stream here.
#[must_use]
pub fn canonical_hash(bytes: &[u8]) -> String {
    format_hash(avalanche(fnv1a_64(bytes)))
}

///
/// TESTS
///
