//! Region chunking: partition a region into processable sub-regions.

use crate::Region;

/// Overlap margin, in cells, added around each chunk's interior.
///
/// Gridding algorithms with a finite influence radius see data beyond the
/// chunk edge, so trimmed interiors line up without seams.
pub const CHUNK_MARGIN_CELLS: usize = 10;

/// A bounded sub-region of a target region.
///
/// `region` is what a gridding module processes (interior plus the overlap
/// margin, clamped to the parent region); `interior` is what survives into
/// the merged output. Interiors of all chunks tile the parent region
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk {
    /// Processing region: interior grown by the overlap margin.
    pub region: Region,
    /// Non-overlapping interior, used to trim the chunk's tile at merge.
    pub interior: Region,
    /// Row index, row 0 at the southern edge.
    pub row: usize,
    /// Column index, column 0 at the western edge.
    pub col: usize,
    /// Overlap margin in cells (0 for a single whole-region chunk).
    pub margin_cells: usize,
}

/// Partition `region` into chunks at the given chunk level.
///
/// Level 0 yields a single chunk covering the whole region with no margin.
/// For level >= 1 the cells-per-chunk-side is `max(cols, rows) / level + 1`,
/// so a higher level means smaller chunks. Chunks are emitted in
/// deterministic row-major order (southern row first).
pub fn chunk(region: &Region, inc_x: f64, inc_y: f64, chunk_level: u32) -> Vec<Chunk> {
    if chunk_level == 0 {
        return vec![Chunk {
            region: *region,
            interior: *region,
            row: 0,
            col: 0,
            margin_cells: 0,
        }];
    }

    let (cols, rows) = region.dimensions(inc_x, inc_y);
    let per_side = (cols.max(rows) / chunk_level as usize).max(1) + 1;

    // Cell-index edge -> geographic coordinate, exact at the region rim.
    let x_at = |cell: usize| {
        if cell >= cols {
            region.xmax
        } else {
            region.xmin + cell as f64 * inc_x
        }
    };
    let y_at = |cell: usize| {
        if cell >= rows {
            region.ymax
        } else {
            region.ymin + cell as f64 * inc_y
        }
    };

    let mut chunks = Vec::new();
    let mut row = 0;
    let mut y0 = 0;
    while y0 < rows {
        let y1 = (y0 + per_side).min(rows);
        let mut col = 0;
        let mut x0 = 0;
        while x0 < cols {
            let x1 = (x0 + per_side).min(cols);
            let interior = Region {
                xmin: x_at(x0),
                xmax: x_at(x1),
                ymin: y_at(y0),
                ymax: y_at(y1),
            };
            let proc = Region {
                xmin: x_at(x0.saturating_sub(CHUNK_MARGIN_CELLS)),
                xmax: x_at((x1 + CHUNK_MARGIN_CELLS).min(cols)),
                ymin: y_at(y0.saturating_sub(CHUNK_MARGIN_CELLS)),
                ymax: y_at((y1 + CHUNK_MARGIN_CELLS).min(rows)),
            };
            chunks.push(Chunk {
                region: proc,
                interior,
                row,
                col,
                margin_cells: CHUNK_MARGIN_CELLS,
            });
            col += 1;
            x0 = x1;
        }
        row += 1;
        y0 = y1;
    }
    chunks
}
