//src/kmer.rs

use ahash::AHashMap;

use crate::error::{Read2ArrayError, Result};
use crate::types::Series;

/// Memoization table from k-mer bytes to integer id.
///
/// Ids are handed out in first-seen order starting at 0, so the id of a new
/// k-mer is always the table size before insertion. Entries are never
/// removed. One cache covers exactly one input file and is never shared
/// between workers.
#[derive(Debug, Clone, Default)]
pub struct KmerCache {
    ids: AHashMap<Vec<u8>, u32>,
}

/// Id for the k-mer inserted into a table that already holds `len` entries.
fn next_id(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Read2ArrayError::KmerIdsExhausted)
}

impl KmerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id already assigned to `kmer`, if any.
    pub fn get(&self, kmer: &[u8]) -> Option<u32> {
        self.ids.get(kmer).copied()
    }

    /// Returns the id of `kmer`, assigning the next unused id if it is new.
    pub fn id_for(&mut self, kmer: &[u8]) -> Result<u32> {
        if let Some(&id) = self.ids.get(kmer) {
            return Ok(id);
        }
        let id = next_id(self.ids.len())?;
        self.ids.insert(kmer.to_vec(), id);
        Ok(id)
    }

    /// Encodes `read` against this cache, inserting every unseen k-mer.
    pub fn encode(&mut self, read: &[u8], k: usize) -> Result<Series> {
        kmers(read, k).map(|kmer| self.id_for(kmer)).collect()
    }
}

/// All windows of width `k` over `read`, left to right.
///
/// Windows are taken over bytes, so a read of `n` bytes always yields
/// `n - k + 1` of them. Yields nothing when `k == 0` or the read is shorter
/// than `k`.
pub fn kmers(read: &[u8], k: usize) -> impl Iterator<Item = &[u8]> + '_ {
    // `windows` panics on 0.
    let width = k.max(1);
    read.windows(width).take(if k == 0 { 0 } else { usize::MAX })
}

/// Converts a read into its k-mer id series, threading the cache through.
///
/// The returned cache holds every insertion made here and must be passed to
/// the next call for the same file. A read shorter than `k` gives an empty
/// series and leaves the cache untouched.
pub fn encode(read: &[u8], k: usize, mut cache: KmerCache) -> Result<(Series, KmerCache)> {
    let series = cache.encode(read, k)?;
    Ok((series, cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_first_seen_ids() {
        let kmers_seen: Vec<&[u8]> = kmers(b"ACGTACGTAC", 4).collect();
        let expected: [&[u8]; 7] = [b"ACGT", b"CGTA", b"GTAC", b"TACG", b"ACGT", b"CGTA", b"GTAC"];
        assert_eq!(kmers_seen, expected);

        let (series, cache) = encode(b"ACGTACGTAC", 4, KmerCache::new()).unwrap();
        assert_eq!(series, vec![0, 1, 2, 3, 0, 1, 2]);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_series_length() {
        let cases: [(&[u8], usize); 4] = [
            (b"ACGTTGCA", 1),
            (b"ACGTTGCA", 3),
            (b"ACGTTGCA", 8),
            (b"NNNNNN", 2),
        ];
        for (read, k) in cases {
            let (series, _) = encode(read, k, KmerCache::new()).unwrap();
            assert_eq!(series.len(), read.len() - k + 1, "k={k}");
        }
    }

    #[test]
    fn test_non_ascii_read_keeps_every_window() {
        let read = "ACGTÄCGTAC".as_bytes();
        assert_eq!(read.len(), 11);

        let (series, cache) = encode(read, 4, KmerCache::new()).unwrap();
        assert_eq!(series.len(), read.len() - 4 + 1);
        // "ACGT" comes before the two-byte character, "GTAC" after it.
        assert_eq!(series[7], cache.get(b"GTAC").unwrap());
        assert_eq!(series[0], cache.get(b"ACGT").unwrap());
    }

    #[test]
    fn test_short_read_gives_empty_series() {
        let (series, cache) = encode(b"ACG", 4, KmerCache::new()).unwrap();
        assert!(series.is_empty());
        assert!(cache.is_empty());

        let (series, _) = encode(b"ACGT", 0, KmerCache::new()).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_reencoding_keeps_ids_stable() {
        let (first, cache) = encode(b"GATTACAGATTACA", 5, KmerCache::new()).unwrap();
        let before = cache.len();
        let (second, cache) = encode(b"GATTACAGATTACA", 5, cache).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), before);
    }

    #[test]
    fn test_shared_kmer_gets_same_id_across_reads() {
        let (a, cache) = encode(b"TTTTACGTA", 4, KmerCache::new()).unwrap();
        let (b, cache) = encode(b"ACGTAGGGG", 4, cache).unwrap();
        let id = cache.get(b"ACGT").unwrap();
        assert_eq!(a[4], id);
        assert_eq!(b[0], id);
        // New k-mers in the second read continue the sequence.
        assert_eq!(b[2], a.iter().max().unwrap() + 1);
    }

    #[test]
    fn test_distinct_kmers_get_distinct_ids() {
        let (series, cache) = encode(b"AACCGGTTAC", 2, KmerCache::new()).unwrap();
        let pairs: [&[u8]; 8] = [b"AA", b"AC", b"CC", b"CG", b"GG", b"GT", b"TT", b"TA"];
        let mut ids: Vec<u32> = pairs.iter().map(|k| cache.get(k).unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(series.last(), Some(&cache.get(b"AC").unwrap()));
    }

    #[test]
    fn test_caches_are_independent() {
        let (_, warm) = encode(b"CCCCGGGG", 3, KmerCache::new()).unwrap();
        let (fresh_series, _) = encode(b"GGGG", 3, KmerCache::new()).unwrap();
        let (warm_series, _) = encode(b"GGGG", 3, warm).unwrap();
        assert_eq!(fresh_series, vec![0, 0]);
        assert_ne!(fresh_series, warm_series);
    }

    #[test]
    fn test_id_space_exhaustion_is_an_error() {
        assert_eq!(next_id(0).unwrap(), 0);
        assert_eq!(next_id(u32::MAX as usize).unwrap(), u32::MAX);
        assert!(matches!(
            next_id(u32::MAX as usize + 1),
            Err(Read2ArrayError::KmerIdsExhausted)
        ));
    }
}
