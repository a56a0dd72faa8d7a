//! Partition of the tile-rows into contiguous domains.

use std::ops::Range;

/// Contiguous band `[lo, hi)` of tile-rows reduced locally.
///
/// A domain never straddles two process rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Domain {
    /// Position of the domain in the partition.
    pub index: usize,
    /// Process row owning every tile-row of the domain.
    pub process: usize,
    pub lo: usize,
    pub hi: usize,
}

impl Domain {
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.hi == self.lo
    }

    pub fn contains(&self, m: usize) -> bool {
        (self.lo..self.hi).contains(&m)
    }

    /// Tile-rows still taking part in column `k` (empty once exhausted).
    pub fn live(&self, k: usize) -> Range<usize> {
        self.lo.max(k).min(self.hi)..self.hi
    }

    /// Whether every tile-row of the domain lies above column `k`'s diagonal.
    pub fn is_exhausted(&self, k: usize) -> bool {
        self.hi <= k
    }
}

/// Partition of `[0, MT)` into domains.
///
/// Tile-rows are first cut into process-row blocks of `block` rows, then each
/// block into domains of `size` rows (the last domain of a block may be
/// short). The partition is shared by every column; a column only walks the
/// domains that still hold live tile-rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPartition {
    size: usize,
    domains: Vec<Domain>,
}

impl DomainPartition {
    /// Split `mt` tile-rows into blocks of `block` rows, and each block into
    /// domains of at most `size` rows.
    ///
    /// # Panics
    /// Panics if `block == 0` or `size == 0`.
    pub fn new(mt: usize, block: usize, size: usize) -> Self {
        assert!(block > 0, "process block must be positive");
        assert!(size > 0, "domain size must be positive");
        let mut domains = Vec::with_capacity(mt.div_ceil(size));
        for process in 0..mt.div_ceil(block) {
            let end = ((process + 1) * block).min(mt);
            let mut lo = process * block;
            while lo < end {
                let hi = (lo + size).min(end);
                domains.push(Domain {
                    index: domains.len(),
                    process,
                    lo,
                    hi,
                });
                lo = hi;
            }
        }
        DomainPartition { size, domains }
    }

    /// Nominal number of tile-rows per domain.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Domain holding tile-row `m`, `None` past the last tile-row.
    pub fn domain_of(&self, m: usize) -> Option<&Domain> {
        let i = self.domains.partition_point(|d| d.hi <= m);
        self.domains.get(i).filter(|d| d.contains(m))
    }

    /// Domains with live tile-rows at column `k`; the first one holds `k`.
    pub fn live(&self, k: usize) -> impl Iterator<Item = &Domain> + '_ {
        let first = self.domains.partition_point(|d| d.is_exhausted(k));
        self.domains[first..].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_partition() {
        let part = DomainPartition::new(6, 3, 3);
        assert_eq!(part.len(), 2);
        assert_eq!(part.domains()[0].live(0), 0..3);
        assert_eq!(part.domains()[1].live(0), 3..6);
        assert_eq!(part.domain_of(4).unwrap().index, 1);
        assert_eq!(part.domain_of(4).unwrap().process, 1);
    }

    #[test]
    fn test_short_last_domain() {
        let part = DomainPartition::new(7, 7, 3);
        let sizes: Vec<usize> = part.domains().iter().map(Domain::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(part.domain_of(6).unwrap().index, 2);
        assert!(part.domain_of(7).is_none());
        assert!(part.domain_of(8).is_none());
    }

    #[test]
    fn test_domains_stay_inside_process_blocks() {
        // two process rows of 3 tile-rows each
        let part = DomainPartition::new(6, 3, 2);
        let bands: Vec<(usize, usize, usize)> =
            part.domains().iter().map(|d| (d.process, d.lo, d.hi)).collect();
        assert_eq!(bands, vec![(0, 0, 2), (0, 2, 3), (1, 3, 5), (1, 5, 6)]);

        let part = DomainPartition::new(6, 3, 4);
        let bands: Vec<(usize, usize)> = part.domains().iter().map(|d| (d.lo, d.hi)).collect();
        assert_eq!(bands, vec![(0, 3), (3, 6)]);
        assert_eq!(part.domain_of(3).unwrap().process, 1);
    }

    #[test]
    fn test_live_domains_shrink_with_column() {
        let part = DomainPartition::new(8, 8, 3);
        let live: Vec<Range<usize>> = part.live(4).map(|d| d.live(4)).collect();
        assert_eq!(live, vec![4..6, 6..8]);
        assert!(part.domains()[0].is_exhausted(4));
        assert!(part.domains()[0].live(4).is_empty());
        assert_eq!(part.live(8).count(), 0);
    }

    #[test]
    fn test_oversized_domain() {
        let part = DomainPartition::new(4, 4, 10);
        assert_eq!(part.len(), 1);
        assert_eq!(part.domains()[0].live(1), 1..4);
    }
}
