//! The lattice of simulated points.
//!
//! Point state is stored structure-of-arrays, column-major: the point at
//! `(column, row)` lives at index `column * rows + row` in every array.
//! The lattice covers the surface plus a padding margin and is centered on
//! it, so edge motion never exposes empty space. It is rebuilt wholesale on
//! resize.

use glam::DVec2;

/// Horizontal padding added to the surface width before counting columns.
pub const PAD_X: f64 = 200.0;
/// Vertical padding added to the surface height before counting rows.
pub const PAD_Y: f64 = 30.0;
/// Upper bound on lattice points. Gaps so small that the lattice would exceed
/// it yield an empty grid.
pub const MAX_POINTS: usize = 1 << 21;

/// Column-major lattice of points with per-point motion state.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    columns: usize,
    rows: usize,
    pub(crate) base: Vec<DVec2>,
    pub(crate) wave: Vec<DVec2>,
    pub(crate) cursor: Vec<DVec2>,
    pub(crate) velocity: Vec<DVec2>,
}

impl Grid {
    /// An empty grid: zero columns, nothing to simulate or draw.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a fresh lattice for a `width x height` surface.
    ///
    /// Yields `ceil((width + PAD_X) / x_gap) + 1` columns of
    /// `ceil((height + PAD_Y) / y_gap) + 1` points, centered on the surface.
    /// Offsets and velocities start at zero. Non-positive or non-finite gaps
    /// or dimensions produce an empty grid, as does a lattice of more than
    /// [`MAX_POINTS`] points.
    pub fn rebuild(width: f64, height: f64, x_gap: f64, y_gap: f64) -> Self {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !(usable(width) && usable(height) && usable(x_gap) && usable(y_gap)) {
            tracing::debug!(width, height, x_gap, y_gap, "degenerate lattice, grid left empty");
            return Self::empty();
        }

        let Some((spans_x, spans_y)) = bounded_spans(width, height, x_gap, y_gap) else {
            tracing::warn!(width, height, x_gap, y_gap, "lattice too dense, grid left empty");
            return Self::empty();
        };
        let columns = spans_x + 1;
        let rows = spans_y + 1;
        let x_start = (width - x_gap * spans_x as f64) / 2.0;
        let y_start = (height - y_gap * spans_y as f64) / 2.0;

        let base: Vec<DVec2> = (0..columns)
            .flat_map(|c| {
                (0..rows).map(move |r| {
                    DVec2::new(x_start + x_gap * c as f64, y_start + y_gap * r as f64)
                })
            })
            .collect();
        let len = base.len();

        tracing::debug!(columns, rows, width, height, "grid rebuilt");
        Self {
            columns,
            rows,
            base,
            wave: vec![DVec2::ZERO; len],
            cursor: vec![DVec2::ZERO; len],
            velocity: vec![DVec2::ZERO; len],
        }
    }

    /// Number of columns (drawn polylines).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of points per column.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of points.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0
    }

    fn index(&self, column: usize, row: usize) -> usize {
        debug_assert!(column < self.columns && row < self.rows);
        column * self.rows + row
    }

    /// Resting lattice position.
    pub fn base(&self, column: usize, row: usize) -> DVec2 {
        self.base[self.index(column, row)]
    }

    /// Noise-driven offset from the most recent step.
    pub fn wave(&self, column: usize, row: usize) -> DVec2 {
        self.wave[self.index(column, row)]
    }

    /// Pointer-driven spring offset.
    pub fn cursor(&self, column: usize, row: usize) -> DVec2 {
        self.cursor[self.index(column, row)]
    }

    /// Pointer-driven spring velocity.
    pub fn velocity(&self, column: usize, row: usize) -> DVec2 {
        self.velocity[self.index(column, row)]
    }

    /// Drawn position: base plus wave offset, plus cursor offset if requested.
    pub fn displaced(&self, column: usize, row: usize, with_cursor: bool) -> DVec2 {
        let i = self.index(column, row);
        let p = self.base[i] + self.wave[i];
        if with_cursor {
            p + self.cursor[i]
        } else {
            p
        }
    }

    /// All cursor offsets, column-major.
    pub fn cursor_offsets(&self) -> &[DVec2] {
        &self.cursor
    }
}

/// Span counts per axis, or `None` when the lattice would hold more than
/// [`MAX_POINTS`] points.
fn bounded_spans(width: f64, height: f64, x_gap: f64, y_gap: f64) -> Option<(usize, usize)> {
    let span = |extent: f64, gap: f64| {
        let n = (extent / gap).ceil();
        (n.is_finite() && n < MAX_POINTS as f64).then_some(n as usize)
    };
    let spans_x = span(width + PAD_X, x_gap)?;
    let spans_y = span(height + PAD_Y, y_gap)?;
    let points = spans_x.checked_add(1)?.checked_mul(spans_y.checked_add(1)?)?;
    (points <= MAX_POINTS).then_some((spans_x, spans_y))
}
