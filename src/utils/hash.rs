use std::collections::{HashMap, HashSet};

pub type FastHashMap<K, V> = HashMap<K, V>;
pub type FastHashSet<V> = HashSet<V>;

const FNV64_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hashes a byte string with 64-bit FNV-1a.
///
/// The result is stable across processes and platforms. Anything used as a
/// cross-archive content hash must go through this function, or override
/// resolution between archives breaks.
pub fn hash64<T: AsRef<[u8]>>(bytes: T) -> u64 {
    let mut state = FNV64_OFFSET;
    for &v in bytes.as_ref() {
        state ^= u64::from(v);
        state = state.wrapping_mul(FNV64_PRIME);
    }
    state
}
