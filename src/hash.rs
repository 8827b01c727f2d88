//! Multiplicative (Fibonacci) hashing for bucket selection.
//!
//! Both paths multiply by a golden-ratio-derived prime and keep the top
//! `bits` bits — the high bits of such a product are distributed far
//! better than the low bits, so the bucket index is a right shift, never
//! a mask. The 64-bit path expresses the multiply as a shift/add/subtract
//! chain (the prime was chosen to make that chain short); the 32-bit path
//! is a single multiply.

/// 2^31 + 2^29 - 2^25 + 2^22 - 2^19 - 2^16 + 1
pub const GOLDEN_RATIO_PRIME_32: u32 = 0x9e37_0001;

/// 2^63 + 2^61 - 2^57 + 2^54 - 2^51 - 2^18 + 1
pub const GOLDEN_RATIO_PRIME_64: u64 = 0x9e37_ffff_fffc_0001;

/// Hash a 64-bit value down to its top `bits` bits.
///
/// `bits` must be at most 64; `bits == 0` yields bucket 0.
pub fn hash_64(val: u64, bits: u32) -> u64 {
    debug_assert!(bits <= 64);
    if bits == 0 {
        return 0;
    }
    // val * GOLDEN_RATIO_PRIME_64 without a hardware multiply: the running
    // shift amounts 18, 33, 3, 3, 4, 2 accumulate to the prime's exponents
    // 18, 51, 54, 57, 61, 63.
    let mut hash = val;
    let mut n = hash;
    n = n.wrapping_shl(18);
    hash = hash.wrapping_sub(n);
    n = n.wrapping_shl(33);
    hash = hash.wrapping_sub(n);
    n = n.wrapping_shl(3);
    hash = hash.wrapping_add(n);
    n = n.wrapping_shl(3);
    hash = hash.wrapping_sub(n);
    n = n.wrapping_shl(4);
    hash = hash.wrapping_add(n);
    n = n.wrapping_shl(2);
    hash = hash.wrapping_add(n);

    hash >> (64 - bits)
}

/// Hash a 32-bit value down to its top `bits` bits.
pub fn hash_32(val: u32, bits: u32) -> u32 {
    debug_assert!(bits <= 32);
    if bits == 0 {
        return 0;
    }
    let hash = val.wrapping_mul(GOLDEN_RATIO_PRIME_32);
    hash >> (32 - bits)
}

/// Hash a word-sized value, picking the 32- or 64-bit path by the build
/// target's word width.
#[cfg(target_pointer_width = "64")]
pub fn hash_long(val: usize, bits: u32) -> usize {
    hash_64(val as u64, bits) as usize
}

#[cfg(target_pointer_width = "32")]
pub fn hash_long(val: usize, bits: u32) -> usize {
    hash_32(val as u32, bits) as usize
}

/// Hash a pointer's bit pattern down to `bits` bits.
pub fn hash_ptr<T>(ptr: *const T, bits: u32) -> usize {
    hash_long(ptr as usize, bits)
}

/// Cheap 32-bit digest of a pointer: on 64-bit targets the upper half is
/// folded into the lower half with xor, then truncated. Use when a stable
/// 32-bit value from a pointer-valued key is enough.
pub fn hash32_ptr<T>(ptr: *const T) -> u32 {
    let val = ptr as usize;
    #[cfg(target_pointer_width = "64")]
    let val = val ^ (val >> 32);
    val as u32
}

/// Key-size dispatch for bucket selection.
///
/// Keys of 4 bytes or fewer always take the 32-bit multiply, even on
/// 64-bit builds — the narrower multiply is cheaper and distributes small
/// keys just as well. 8-byte keys take the 64-bit path; word-sized keys
/// follow the build target.
pub trait HashKey: Copy {
    /// Hash `self` down to `bits` bits, returning a bucket index.
    fn hash_min(self, bits: u32) -> usize;
}

macro_rules! hash_key_32 {
    ($($t:ty),*) => {$(
        impl HashKey for $t {
            #[inline]
            fn hash_min(self, bits: u32) -> usize {
                hash_32(self as u32, bits) as usize
            }
        }
    )*};
}

macro_rules! hash_key_64 {
    ($($t:ty),*) => {$(
        impl HashKey for $t {
            #[inline]
            fn hash_min(self, bits: u32) -> usize {
                hash_64(self as u64, bits) as usize
            }
        }
    )*};
}

hash_key_32!(u8, u16, u32, i8, i16, i32);
hash_key_64!(u64, i64);

impl HashKey for usize {
    #[inline]
    fn hash_min(self, bits: u32) -> usize {
        hash_long(self, bits)
    }
}

impl HashKey for isize {
    #[inline]
    fn hash_min(self, bits: u32) -> usize {
        hash_long(self as usize, bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: The shift/add chain is exactly the 64-bit golden-ratio
    /// multiply.
    #[test]
    fn hash_64_matches_multiply() {
        for val in [0u64, 1, 2, 0xdead_beef, u64::MAX, 0x0123_4567_89ab_cdef] {
            let product = val.wrapping_mul(GOLDEN_RATIO_PRIME_64);
            for bits in [1, 8, 32, 64] {
                assert_eq!(hash_64(val, bits), product >> (64 - bits), "val={val:#x} bits={bits}");
            }
        }
    }

    /// Invariant: The 32-bit path keeps the top bits of the product.
    #[test]
    fn hash_32_keeps_top_bits() {
        for val in [0u32, 1, 0xdead_beef, u32::MAX] {
            let product = val.wrapping_mul(GOLDEN_RATIO_PRIME_32);
            for bits in [1, 8, 16, 32] {
                assert_eq!(hash_32(val, bits), product >> (32 - bits));
            }
        }
    }

    /// Invariant: Results fit in `bits` bits, and `bits == 0` maps
    /// everything to bucket 0.
    #[test]
    fn output_range() {
        for k in 0u64..256 {
            assert!(hash_64(k, 8) < 256);
            assert!(hash_32(k as u32, 8) < 256);
        }
        assert_eq!(hash_64(0xdead_beef, 0), 0);
        assert_eq!(hash_32(0xdead_beef, 0), 0);
    }

    /// Invariant: Small keys dispatch to the 32-bit path; 8-byte keys to
    /// the 64-bit path.
    #[test]
    fn hash_min_dispatch() {
        let bits = 8;
        assert_eq!(7u8.hash_min(bits), hash_32(7, bits) as usize);
        assert_eq!(7u16.hash_min(bits), hash_32(7, bits) as usize);
        assert_eq!(7u32.hash_min(bits), hash_32(7, bits) as usize);
        assert_eq!(7i32.hash_min(bits), hash_32(7, bits) as usize);
        assert_eq!(7u64.hash_min(bits), hash_64(7, bits) as usize);
        // A value only representable in 64 bits must not collapse to the
        // 32-bit path.
        let wide = 0x1_0000_0007u64;
        assert_ne!(wide.hash_min(bits), hash_32(7, bits) as usize);
    }

    /// Statistical sanity: sequential keys spread across buckets with no
    /// chain longer than a small multiple of the mean.
    #[test]
    fn distribution_sanity_sequential_keys() {
        let bits = 8;
        let buckets = 1usize << bits;
        let keys = 4096u32;
        let mut counts = vec![0u32; buckets];
        for k in 0..keys {
            counts[k.hash_min(bits)] += 1;
        }
        let mean = keys / buckets as u32; // 16
        let max = *counts.iter().max().unwrap();
        assert!(
            max <= 4 * mean,
            "worst bucket {max} exceeds 4x mean {mean}"
        );
    }

    /// Invariant: `hash32_ptr` folds the upper half on 64-bit targets and
    /// is stable for a given address.
    #[test]
    fn ptr_hashing() {
        let x = 42u64;
        let p = &x as *const u64;
        assert_eq!(hash32_ptr(p), hash32_ptr(p));
        #[cfg(target_pointer_width = "64")]
        {
            let val = p as usize;
            assert_eq!(hash32_ptr(p), (val ^ (val >> 32)) as u32);
        }
        assert!(hash_ptr(p, 8) < 256);
    }
}
