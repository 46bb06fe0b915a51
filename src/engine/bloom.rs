//! TESSERA - Bloom Filter
//! A space-efficient probabilistic data structure used to test
//! whether an element is a member of a set.
//!
//! False positives are possible, but false negatives are not.
//! Used in LSM-Trees to skip table reads for keys that
//! definitely do not exist in a given table.
//!
//! ## Binary Format
//! ```text
//! [bit array: nBits / 8 bytes][k: 1 byte]
//! ```
//! The filter is its own serialized form; table writers persist
//! `as_bytes()` and readers rebuild it with `Filter::from`.

use std::f64::consts::LN_2;

use super::hash::hash;

/// Largest probe count a well-formed filter carries.
pub const MAX_PROBES: u8 = 30;

/// An immutable Bloom filter over 32-bit key hashes.
///
/// ## How it works
/// - Each hash `h` is probed `k` times using double hashing:
///   start at `h`, step by `delta = rotr(h, 17)`
/// - On build: set every probed bit
/// - On lookup: any probed bit clear means **definitely not** present
///
/// ## False Positive Rate
/// With `k` probes and `m` bits for `n` keys:
/// `FPR ≈ (1 - e^(-kn/m))^k`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter(Vec<u8>);

impl Filter {
    /// Build a filter over `keys` (already hashed) with `bits_per_key` density.
    ///
    /// # Formulas
    /// - Probes: `k = round(bits_per_key * ln 2)`, clamped to `[1, 30]`
    /// - Bits: `max(64, n * bits_per_key)`, rounded up to a whole byte
    pub fn new(keys: &[u32], bits_per_key: usize) -> Self {
        let k = ((bits_per_key as f64) * LN_2).round().clamp(1.0, MAX_PROBES as f64) as u32;

        let n_bits = (keys.len() * bits_per_key).max(64);
        let n_bytes = n_bits.div_ceil(8);
        let n_bits = (n_bytes * 8) as u32;

        let mut filter = vec![0u8; n_bytes + 1];
        for &h in keys {
            let delta = h.rotate_right(17);
            let mut h = h;
            for _ in 0..k {
                let bit_pos = h % n_bits;
                filter[(bit_pos / 8) as usize] |= 1 << (bit_pos % 8);
                h = h.wrapping_add(delta);
            }
        }
        filter[n_bytes] = k as u8;
        Filter(filter)
    }

    /// Build a filter by hashing raw keys.
    pub fn from_keys<K: AsRef<[u8]>>(keys: &[K], bits_per_key: usize) -> Self {
        let hashes: Vec<u32> = keys.iter().map(|k| hash(k.as_ref())).collect();
        Self::new(&hashes, bits_per_key)
    }

    /// Check if a hash **may** be in the set.
    /// - Returns `false` → **definitely not** in the set
    /// - Returns `true` → **probably** in the set (may be false positive)
    ///
    /// Blobs shorter than two bytes contain nothing; a probe count above
    /// `MAX_PROBES` matches everything.
    pub fn may_contain(&self, h: u32) -> bool {
        let f = &self.0;
        if f.len() < 2 {
            return false;
        }
        let k = f[f.len() - 1];
        if k > MAX_PROBES {
            return true;
        }

        let n_bits = (8 * (f.len() - 1)) as u32;
        let delta = h.rotate_right(17);
        let mut h = h;
        for _ in 0..k {
            let bit_pos = h % n_bits;
            if f[(bit_pos / 8) as usize] & (1 << (bit_pos % 8)) == 0 {
                return false;
            }
            h = h.wrapping_add(delta);
        }
        true
    }

    /// Check if a raw key **may** be in the set.
    pub fn may_contain_key(&self, key: &[u8]) -> bool {
        self.may_contain(hash(key))
    }

    /// Number of probes per key, as stored in the trailing byte.
    pub fn hash_count(&self) -> u8 {
        self.0.last().copied().unwrap_or(0)
    }

    /// Number of bits in the bit array.
    pub fn bit_len(&self) -> usize {
        self.0.len().saturating_sub(1) * 8
    }

    /// The serialized filter.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Estimated false positive rate for `n` keys.
    pub fn estimated_fpr(&self, n: usize) -> f64 {
        if n == 0 || self.bit_len() == 0 {
            return 0.0;
        }
        let k = self.hash_count() as f64;
        let m = self.bit_len() as f64;
        (1.0 - (-k * n as f64 / m).exp()).powf(k)
    }
}

impl From<Vec<u8>> for Filter {
    fn from(bytes: Vec<u8>) -> Self {
        Filter(bytes)
    }
}

impl AsRef<[u8]> for Filter {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Bits per key needed to hit `fp` false positives.
///
/// Optimal size is `m = -n * ln(p) / ln(2)^2`; this returns `ceil(m / n)`.
pub fn bloom_bits_per_key(num_entries: usize, fp: f64) -> usize {
    let n = num_entries.max(1) as f64;
    let fp = fp.clamp(1e-9, 0.999);
    let size = -n * fp.ln() / LN_2.powi(2);
    (size / n).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abc_scenario() {
        let keys: Vec<u32> = [&b"a"[..], b"b", b"c"].iter().map(|k| hash(k)).collect();
        let f = Filter::new(&keys, 10);

        assert!(f.may_contain(hash(b"a")));
        assert!(f.may_contain(hash(b"b")));
        assert!(f.may_contain(hash(b"c")));
        // not guaranteed, but 3 keys in 64 bits with k=7 makes a hit very unlikely
        assert!(!f.may_contain_key(b"z"));
    }

    #[test]
    fn test_layout() {
        let f = Filter::new(&[1, 2, 3], 10);
        // 30 bits requested, 64 minimum
        assert_eq!(f.as_bytes().len(), 8 + 1);
        assert_eq!(f.bit_len(), 64);
        assert_eq!(f.hash_count(), 7);

        let f = Filter::new(&(0..100).collect::<Vec<u32>>(), 10);
        assert_eq!(f.bit_len(), 1000);
        assert_eq!(f.as_bytes().len(), 125 + 1);
    }

    #[test]
    fn test_probe_count_bounds() {
        assert_eq!(Filter::new(&[1], 0).hash_count(), 1);
        assert_eq!(Filter::new(&[1], 1).hash_count(), 1);
        assert_eq!(Filter::new(&[1], 100).hash_count(), MAX_PROBES);
    }

    #[test]
    fn test_no_false_negatives() {
        let keys: Vec<u32> = (0..5000u32).map(|i| hash(format!("key_{}", i).as_bytes())).collect();
        for bits_per_key in [1, 4, 10, 20] {
            let f = Filter::new(&keys, bits_per_key);
            for &h in &keys {
                assert!(f.may_contain(h), "false negative at {} bits/key", bits_per_key);
            }
        }
    }

    #[test]
    fn test_false_positive_rate_near_target() {
        let n = 10_000;
        let fp = 0.01;
        let keys: Vec<u32> = (0..n).map(|i| hash(format!("present_{}", i).as_bytes())).collect();
        let f = Filter::new(&keys, bloom_bits_per_key(n, fp));

        let m = 100_000;
        let hits = (0..m)
            .filter(|i| f.may_contain_key(format!("absent_{}", i).as_bytes()))
            .count();
        let rate = hits as f64 / m as f64;
        assert!(rate < fp * 2.0, "false positive rate {} too high", rate);
    }

    #[test]
    fn test_bits_per_key_formula() {
        assert_eq!(bloom_bits_per_key(1000, 0.01), 10);
        assert_eq!(bloom_bits_per_key(1000, 0.1), 5);
        assert_eq!(bloom_bits_per_key(0, 0.01), 10);
    }

    #[test]
    fn test_degenerate_filters() {
        assert!(!Filter::from(vec![]).may_contain(42));
        assert!(!Filter::from(vec![0xFF]).may_contain(42));

        // k above 30 matches everything
        let escape = Filter::from(vec![0, 0, 0, 0, 0, 0, 0, 0, 31]);
        assert!(escape.may_contain(42));
        assert!(escape.may_contain_key(b"anything"));
    }

    #[test]
    fn test_empty_key_set() {
        let f = Filter::new(&[], 10);
        assert_eq!(f.bit_len(), 64);
        assert!(!f.may_contain_key(b"anything"));
    }

    #[test]
    fn test_reload_from_bytes() {
        let f = Filter::from_keys(&["alpha", "bravo"], 10);
        let reloaded = Filter::from(f.as_bytes().to_vec());
        assert_eq!(reloaded, f);
        assert!(reloaded.may_contain_key(b"alpha"));
        assert!(reloaded.may_contain_key(b"bravo"));
    }

    #[test]
    fn test_estimated_fpr() {
        let f = Filter::new(&[], 10);
        assert_eq!(f.estimated_fpr(0), 0.0);

        let keys: Vec<u32> = (0..100).map(|i| hash(format!("k{}", i).as_bytes())).collect();
        let f = Filter::new(&keys, 10);
        let fpr = f.estimated_fpr(100);
        assert!(fpr > 0.0);
        assert!(fpr < 0.05);
    }
}
