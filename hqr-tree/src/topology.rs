//! Tree topologies: how an ordered list of leaves is reduced into leaf 0.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::tree::{Merge, ReductionTree};
use crate::error::TopologyParseError;

/// Working buffer for the alive leaves of a round-based reduction.
type AliveVec = SmallVec<[usize; 32]>;

/// Shape of a reduction tree.
///
/// The set of shapes is closed; every schedule level picks one at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TreeTopology {
    /// Every leaf is eliminated directly into leaf 0, one per round.
    #[default]
    Flat,
    /// Leaf `j` is eliminated into `j - 2^t` in round `t + 1`, where `t` is
    /// the number of trailing zeros of `j`.
    Binary,
    /// Round `r` eliminates `F_r` leaves from the bottom of the alive list
    /// (`F = 1, 1, 2, 3, 5, ...`), capped at half the alive leaves.
    Fibonacci,
    /// Each round eliminates the bottom half of the alive leaves into the
    /// top half.
    Greedy,
}

impl TreeTopology {
    /// Every topology, in option-code order.
    pub const ALL: [TreeTopology; 4] = [
        TreeTopology::Flat,
        TreeTopology::Greedy,
        TreeTopology::Fibonacci,
        TreeTopology::Binary,
    ];

    /// Decode the integer option code (0 = flat, 1 = greedy, 2 = fibonacci,
    /// 3 = binary).
    pub fn from_code(code: i32) -> Result<Self, TopologyParseError> {
        match code {
            0 => Ok(TreeTopology::Flat),
            1 => Ok(TreeTopology::Greedy),
            2 => Ok(TreeTopology::Fibonacci),
            3 => Ok(TreeTopology::Binary),
            other => Err(TopologyParseError::UnknownCode(other)),
        }
    }

    /// Integer option code, inverse of [`TreeTopology::from_code`].
    pub fn code(self) -> i32 {
        match self {
            TreeTopology::Flat => 0,
            TreeTopology::Greedy => 1,
            TreeTopology::Fibonacci => 2,
            TreeTopology::Binary => 3,
        }
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            TreeTopology::Flat => "flat",
            TreeTopology::Binary => "binary",
            TreeTopology::Fibonacci => "fibonacci",
            TreeTopology::Greedy => "greedy",
        }
    }

    /// Build the reduction tree over `n` ordered leaves.
    ///
    /// `n = 0` yields an empty tree and `n = 1` a lone root without merges.
    pub fn build(self, n: usize) -> ReductionTree {
        let merges = match self {
            TreeTopology::Flat => flat_merges(n),
            TreeTopology::Binary => binary_merges(n),
            TreeTopology::Fibonacci => fibonacci_merges(n),
            TreeTopology::Greedy => greedy_merges(n),
        };
        ReductionTree::from_merges(n, merges)
    }
}

impl fmt::Display for TreeTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreeTopology {
    type Err = TopologyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(TreeTopology::Flat),
            "binary" | "bin" => Ok(TreeTopology::Binary),
            "fibonacci" | "fibo" => Ok(TreeTopology::Fibonacci),
            "greedy" => Ok(TreeTopology::Greedy),
            _ => Err(TopologyParseError::UnknownName(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Shape generators
// ---------------------------------------------------------------------------

fn flat_merges(n: usize) -> Vec<Merge> {
    (1..n)
        .map(|victim| Merge {
            level: victim,
            survivor: 0,
            victim,
        })
        .collect()
}

fn binary_merges(n: usize) -> Vec<Merge> {
    (1..n)
        .map(|victim| {
            let t = victim.trailing_zeros() as usize;
            Merge {
                level: t + 1,
                survivor: victim - (1 << t),
                victim,
            }
        })
        .collect()
}

fn greedy_merges(n: usize) -> Vec<Merge> {
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    let mut alive: AliveVec = (0..n).collect();
    let mut level = 0;
    while alive.len() > 1 {
        level += 1;
        let half = alive.len().div_ceil(2);
        for (j, &victim) in alive[half..].iter().enumerate() {
            merges.push(Merge {
                level,
                survivor: alive[j],
                victim,
            });
        }
        alive.truncate(half);
    }
    merges
}

fn fibonacci_merges(n: usize) -> Vec<Merge> {
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    let mut alive: AliveVec = (0..n).collect();
    let (mut prev, mut cur) = (0usize, 1usize);
    let mut level = 0;
    while alive.len() > 1 {
        level += 1;
        let count = cur.min(alive.len() / 2);
        let base = alive.len() - count;
        for j in 0..count {
            merges.push(Merge {
                level,
                survivor: alive[base - count + j],
                victim: alive[base + j],
            });
        }
        alive.truncate(base);
        (prev, cur) = (cur, prev + cur);
    }
    merges
}
