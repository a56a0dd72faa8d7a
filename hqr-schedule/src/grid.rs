//! Tiling of the factorized matrix and its distribution over a process grid.

use crate::error::{ConfigError, QueryError, QueryResult};

/// Shape of a tiled matrix distributed over a `P x Q` process grid.
///
/// Tile-rows are block-distributed over process rows (each process row owns
/// `ceil(MT / P)` consecutive tile-rows) and tile-columns are distributed
/// cyclically over process columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGrid {
    m: usize,
    n: usize,
    mb: usize,
    nb: usize,
    mt: usize,
    nt: usize,
    p: usize,
    q: usize,
}

fn check_positive(values: &[(usize, &'static str)]) -> Result<(), ConfigError> {
    match values.iter().find(|(v, _)| *v == 0) {
        Some(&(_, what)) => Err(ConfigError::ZeroDimension { what }),
        None => Ok(()),
    }
}

impl TileGrid {
    /// Grid of `mt x nt` unit tiles over a `p x q` process grid.
    pub fn new(mt: usize, nt: usize, p: usize, q: usize) -> Result<Self, ConfigError> {
        check_positive(&[
            (mt, "tile-row count"),
            (nt, "tile-column count"),
            (p, "process-grid rows"),
            (q, "process-grid columns"),
        ])?;
        Ok(TileGrid {
            m: mt,
            n: nt,
            mb: 1,
            nb: 1,
            mt,
            nt,
            p,
            q,
        })
    }

    /// Grid of an `m x n` matrix cut into `mb x nb` tiles; the last tile-row
    /// and tile-column may be partial.
    pub fn from_dims(
        m: usize,
        n: usize,
        mb: usize,
        nb: usize,
        p: usize,
        q: usize,
    ) -> Result<Self, ConfigError> {
        check_positive(&[
            (m, "matrix rows"),
            (n, "matrix columns"),
            (mb, "tile height"),
            (nb, "tile width"),
            (p, "process-grid rows"),
            (q, "process-grid columns"),
        ])?;
        Ok(TileGrid {
            m,
            n,
            mb,
            nb,
            mt: m.div_ceil(mb),
            nt: n.div_ceil(nb),
            p,
            q,
        })
    }

    /// Number of tile-rows.
    pub fn mt(&self) -> usize {
        self.mt
    }

    /// Number of tile-columns.
    pub fn nt(&self) -> usize {
        self.nt
    }

    /// Process-grid rows.
    pub fn p(&self) -> usize {
        self.p
    }

    /// Process-grid columns.
    pub fn q(&self) -> usize {
        self.q
    }

    /// Nominal tile height.
    pub fn mb(&self) -> usize {
        self.mb
    }

    /// Nominal tile width.
    pub fn nb(&self) -> usize {
        self.nb
    }

    /// Number of columns that are factorized: `min(MT, NT)`.
    pub fn min_mn(&self) -> usize {
        self.mt.min(self.nt)
    }

    /// Tile-rows owned by each process row.
    pub fn rows_per_process(&self) -> usize {
        self.mt.div_ceil(self.p)
    }

    /// Process `(p, q)` owning tile `(row, col)`.
    pub fn owner(&self, row: usize, col: usize) -> QueryResult<(usize, usize)> {
        self.check_tile(row, col)?;
        Ok((row / self.rows_per_process(), col % self.q))
    }

    /// Height of tile-row `row`, accounting for a partial last tile.
    pub fn tile_height(&self, row: usize) -> QueryResult<usize> {
        if row >= self.mt {
            return Err(QueryError::RowOutOfRange { m: row, mt: self.mt });
        }
        Ok(if row + 1 == self.mt {
            self.m - row * self.mb
        } else {
            self.mb
        })
    }

    /// Width of tile-column `col`, accounting for a partial last tile.
    pub fn tile_width(&self, col: usize) -> QueryResult<usize> {
        if col >= self.nt {
            return Err(QueryError::ColumnOutOfRange { k: col, nt: self.nt });
        }
        Ok(if col + 1 == self.nt {
            self.n - col * self.nb
        } else {
            self.nb
        })
    }

    /// Grid of the transposed matrix, used for LQ schedules.
    pub fn transposed(&self) -> Self {
        TileGrid {
            m: self.n,
            n: self.m,
            mb: self.nb,
            nb: self.mb,
            mt: self.nt,
            nt: self.mt,
            p: self.q,
            q: self.p,
        }
    }

    pub(crate) fn check_tile(&self, row: usize, col: usize) -> QueryResult<()> {
        if col >= self.nt {
            return Err(QueryError::ColumnOutOfRange { k: col, nt: self.nt });
        }
        if row >= self.mt {
            return Err(QueryError::RowOutOfRange { m: row, mt: self.mt });
        }
        Ok(())
    }
}
