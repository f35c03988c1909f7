//! Dense phase-one simplex for nonnegative feasibility.
//!
//! Decides whether `A x = b` admits a solution with `x >= 0`. Artificial
//! variables are added on every row and their sum is minimized; the system
//! is feasible iff the optimum is zero.
//!
//! Pivoting follows Bland's rule (smallest entering index, smallest leaving
//! basis index on ties), which rules out cycling on degenerate problems. The
//! problems solved here are small (one row per modality plus the convexity
//! row), so a dense tableau is sufficient.

use thiserror::Error;

/// Threshold under which the phase-one objective is treated as zero.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-8;

/// Smallest magnitude accepted as a pivot or a negative reduced cost.
const PIVOT_TOLERANCE: f64 = 1e-11;

/// Errors from the feasibility solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimplexError {
    #[error("matrix has {rows} rows but right-hand side has {rhs} entries")]
    ShapeMismatch { rows: usize, rhs: usize },

    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("non-finite coefficient in row {row}")]
    NonFinite { row: usize },

    #[error("simplex did not terminate within {0} pivots")]
    IterationLimit(usize),
}

struct Tableau {
    rows: usize,
    width: usize,
    cells: Vec<f64>,
    objective: Vec<f64>,
    basis: Vec<usize>,
}

impl Tableau {
    fn build(matrix: &[Vec<f64>], rhs: &[f64], cols: usize) -> Self {
        let rows = matrix.len();
        let width = cols + rows + 1;
        let mut cells = vec![0.0; rows * width];
        let mut objective = vec![0.0; width];

        for (r, (row, &b)) in matrix.iter().zip(rhs).enumerate() {
            let sign = if b < 0.0 { -1.0 } else { 1.0 };
            let base = r * width;
            for (c, &a) in row.iter().enumerate() {
                cells[base + c] = sign * a;
                objective[c] -= sign * a;
            }
            cells[base + cols + r] = 1.0;
            cells[base + width - 1] = sign * b;
            objective[width - 1] -= sign * b;
        }

        Self {
            rows,
            width,
            cells,
            objective,
            basis: (cols..cols + rows).collect(),
        }
    }

    #[inline]
    fn at(&self, r: usize, c: usize) -> f64 {
        self.cells[r * self.width + c]
    }

    fn entering(&self) -> Option<usize> {
        (0..self.width - 1).find(|&c| self.objective[c] < -PIVOT_TOLERANCE)
    }

    fn leaving(&self, col: usize) -> Option<usize> {
        let rhs = self.width - 1;
        let mut best: Option<(usize, f64)> = None;
        for r in 0..self.rows {
            let a = self.at(r, col);
            if a <= PIVOT_TOLERANCE {
                continue;
            }
            let ratio = self.at(r, rhs) / a;
            best = match best {
                None => Some((r, ratio)),
                Some((br, bratio)) => {
                    if ratio < bratio - PIVOT_TOLERANCE
                        || ((ratio - bratio).abs() <= PIVOT_TOLERANCE
                            && self.basis[r] < self.basis[br])
                    {
                        Some((r, ratio))
                    } else {
                        Some((br, bratio))
                    }
                }
            };
        }
        best.map(|(r, _)| r)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let width = self.width;
        let pivot = self.at(row, col);
        for c in 0..width {
            self.cells[row * width + c] /= pivot;
        }

        for r in 0..self.rows {
            if r == row {
                continue;
            }
            let factor = self.at(r, col);
            if factor == 0.0 {
                continue;
            }
            for c in 0..width {
                let delta = factor * self.cells[row * width + c];
                self.cells[r * width + c] -= delta;
            }
        }

        let factor = self.objective[col];
        if factor != 0.0 {
            for c in 0..width {
                self.objective[c] -= factor * self.cells[row * width + c];
            }
        }

        self.basis[row] = col;
    }

    /// Phase-one objective value (sum of artificial variables).
    fn infeasibility(&self) -> f64 {
        -self.objective[self.width - 1]
    }
}

/// Decide whether `matrix · x = rhs` has a solution with `x >= 0`.
///
/// `matrix` is row-major; every row must have the same length. An empty
/// system is trivially feasible.
pub fn nonnegative_feasible(matrix: &[Vec<f64>], rhs: &[f64]) -> Result<bool, SimplexError> {
    if matrix.len() != rhs.len() {
        return Err(SimplexError::ShapeMismatch {
            rows: matrix.len(),
            rhs: rhs.len(),
        });
    }
    if matrix.is_empty() {
        return Ok(true);
    }

    let cols = matrix[0].len();
    for (r, row) in matrix.iter().enumerate() {
        if row.len() != cols {
            return Err(SimplexError::RaggedRow {
                row: r,
                expected: cols,
                found: row.len(),
            });
        }
        if !rhs[r].is_finite() || row.iter().any(|v| !v.is_finite()) {
            return Err(SimplexError::NonFinite { row: r });
        }
    }

    let mut tableau = Tableau::build(matrix, rhs, cols);
    let limit = 64 * (cols + matrix.len()) + 128;

    for _ in 0..limit {
        let Some(col) = tableau.entering() else {
            return Ok(tableau.infeasibility() <= FEASIBILITY_TOLERANCE);
        };
        let Some(row) = tableau.leaving(col) else {
            // Phase one is bounded below by zero; an unbounded column means
            // the objective can no longer improve.
            return Ok(tableau.infeasibility() <= FEASIBILITY_TOLERANCE);
        };
        tableau.pivot(row, col);
    }

    Err(SimplexError::IterationLimit(limit))
}
