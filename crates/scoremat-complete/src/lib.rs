//! Fill in the cells a scoring-matrix file left out.
//!
//! Matrix files routinely ship only one triangle, and often omit the
//! ambiguity or stop rows. Completion runs three deterministic, row-major
//! phases over the canonical matrix:
//!
//! 1. [`symmetrize`]: a missing `(r, c)` takes `(c, r)`.
//! 2. [`extrema`]: min and max over every present score.
//! 3. [`apply_fallback`]: a [`FallbackPolicy`] fills what symmetry could not.
//!    - `Ambiguity` copies `D` into `B` and `E` into `Z`.
//!    - `Wildcard` gives the stop row/column the global minimum and `(*,*)`
//!      the constant [`STOP_DIAGONAL_SCORE`].
//!
//! Each phase consumes the matrix and returns it. [`Completer::complete`]
//! chains them and records, for every cell, which rule produced its value
//! ([`CellSource`]). Cells nothing could fill stay missing and are listed in
//! [`Completion::unresolved`]; callers decide whether that is fatal.
//!
//! # Example
//! ```
//! use scoremat_complete::{CellSource, Completer};
//! use scoremat_types::{Alphabet, ScoreMatrix, Symbol};
//!
//! let mut m = ScoreMatrix::empty(Alphabet::Blast);
//! m.set(Symbol::R.index(), Symbol::A.index(), -1);
//!
//! let done = Completer::for_alphabet(Alphabet::Blast).complete(m);
//! assert_eq!(done.matrix.score(Symbol::A, Symbol::R), Some(-1));
//! assert_eq!(done.source(Symbol::A.index(), Symbol::R.index()), CellSource::Mirrored);
//! ```
//!
//! For a runnable demo, see `cargo run -p scoremat-complete --example inspect -- <file>`.

use scoremat_types::{Alphabet, Cell, ScoreMatrix, Symbol};
use tracing::{debug, warn};

/// Score given to an unresolved `(*,*)` cell under [`FallbackPolicy::Wildcard`].
pub const STOP_DIAGONAL_SCORE: i32 = 1;

/// Rule set used after symmetrization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FallbackPolicy {
    /// Symmetrization only.
    None,
    /// `B` copies `D`, `Z` copies `E` (FASTA-style matrices).
    Ambiguity,
    /// Stop row/column takes the global minimum (BLAST-style matrices).
    Wildcard,
}

impl FallbackPolicy {
    /// Policy the legacy converters pair with each alphabet.
    pub fn for_alphabet(alphabet: Alphabet) -> Self {
        match alphabet {
            Alphabet::Blast => FallbackPolicy::Wildcard,
            Alphabet::Fasta => FallbackPolicy::Ambiguity,
        }
    }
}

/// Where a completed cell's value came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CellSource {
    Loaded,
    Mirrored,
    AmbiguityCopy { from: Cell },
    WildcardMinimum,
    StopDiagonal,
    Unresolved,
}

/// Smallest and largest present score.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Extrema {
    pub min: i32,
    pub max: i32,
}

/// Result of a full completion run.
#[derive(Clone, Debug)]
pub struct Completion {
    pub matrix: ScoreMatrix,
    /// Extrema after symmetrization; `None` when the input had no scores.
    pub extrema: Option<Extrema>,
    /// Cells still missing after every phase, row-major.
    pub unresolved: Vec<Cell>,
    sources: Vec<CellSource>,
}

impl Completion {
    pub fn source(&self, row: usize, col: usize) -> CellSource {
        self.sources[row * self.matrix.size() + col]
    }

    /// Number of cells filled by rules matching `pred`.
    pub fn count_sources(&self, pred: impl Fn(&CellSource) -> bool) -> usize {
        self.sources.iter().filter(|s| pred(s)).count()
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Runs symmetrization and the fallback policy over loaded matrices.
#[derive(Clone, Copy, Debug)]
pub struct Completer {
    policy: FallbackPolicy,
}

impl Completer {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn for_alphabet(alphabet: Alphabet) -> Self {
        Self::new(FallbackPolicy::for_alphabet(alphabet))
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Run every phase and record per-cell provenance.
    pub fn complete(&self, matrix: ScoreMatrix) -> Completion {
        let n = matrix.size();
        let mut sources: Vec<CellSource> = (0..n * n)
            .map(|off| {
                if matrix.is_missing(off / n, off % n) {
                    CellSource::Unresolved
                } else {
                    CellSource::Loaded
                }
            })
            .collect();
        let mut record = |row: usize, col: usize, source: CellSource| {
            sources[row * n + col] = source;
        };

        let mut matrix = matrix;
        symmetrize_with(&mut matrix, &mut record);
        let extrema = extrema(&matrix);
        fallback_with(&mut matrix, self.policy, extrema, &mut record);

        let unresolved = matrix.missing_cells();
        if !unresolved.is_empty() {
            warn!(
                "{} cells left unresolved after completion ({:?} fallback)",
                unresolved.len(),
                self.policy
            );
            for cell in &unresolved {
                debug!("unresolved cell {cell}");
            }
        }

        Completion {
            matrix,
            extrema,
            unresolved,
            sources,
        }
    }
}

/// Phase 1: fill each missing cell from its mirror image, in a single pass.
pub fn symmetrize(mut matrix: ScoreMatrix) -> ScoreMatrix {
    symmetrize_with(&mut matrix, &mut |_, _, _| {});
    matrix
}

/// Phase 2: min and max over present cells.
pub fn extrema(matrix: &ScoreMatrix) -> Option<Extrema> {
    matrix.present_scores().fold(None, |acc, score| {
        Some(match acc {
            None => Extrema {
                min: score,
                max: score,
            },
            Some(Extrema { min, max }) => Extrema {
                min: min.min(score),
                max: max.max(score),
            },
        })
    })
}

/// Phase 3: apply `policy` to cells symmetrization left missing.
///
/// `extrema` should come from [`extrema`] on the symmetrized matrix.
pub fn apply_fallback(
    mut matrix: ScoreMatrix,
    policy: FallbackPolicy,
    extrema: Option<Extrema>,
) -> ScoreMatrix {
    fallback_with(&mut matrix, policy, extrema, &mut |_, _, _| {});
    matrix
}

fn symmetrize_with(matrix: &mut ScoreMatrix, record: &mut impl FnMut(usize, usize, CellSource)) {
    let n = matrix.size();
    for row in 0..n {
        for col in 0..n {
            if matrix.is_missing(row, col)
                && let Some(score) = matrix.get(col, row)
            {
                matrix.set(row, col, score);
                record(row, col, CellSource::Mirrored);
            }
        }
    }
}

fn fallback_with(
    matrix: &mut ScoreMatrix,
    policy: FallbackPolicy,
    extrema: Option<Extrema>,
    record: &mut impl FnMut(usize, usize, CellSource),
) {
    match policy {
        FallbackPolicy::None => {}
        FallbackPolicy::Ambiguity => fill_ambiguity(matrix, record),
        FallbackPolicy::Wildcard => fill_wildcard(matrix, extrema, record),
    }
}

// Row rules run before column rules within a cell, so (B,Z) reads (D,Z)
// first and only then (B,E).
fn fill_ambiguity(matrix: &mut ScoreMatrix, record: &mut impl FnMut(usize, usize, CellSource)) {
    let alphabet = matrix.alphabet();
    let symbols = alphabet.symbols();
    let (Some(b), Some(z), Some(d), Some(e)) = (
        alphabet.index_of(Symbol::B),
        alphabet.index_of(Symbol::Z),
        alphabet.index_of(Symbol::D),
        alphabet.index_of(Symbol::E),
    ) else {
        return;
    };

    let n = matrix.size();
    for row in 0..n {
        for col in 0..n {
            let rules = [
                (row == b, d, col),
                (row == z, e, col),
                (col == b, row, d),
                (col == z, row, e),
            ];
            for (applies, from_row, from_col) in rules {
                if applies
                    && matrix.is_missing(row, col)
                    && let Some(score) = matrix.get(from_row, from_col)
                {
                    matrix.set(row, col, score);
                    record(
                        row,
                        col,
                        CellSource::AmbiguityCopy {
                            from: Cell {
                                row: symbols[from_row],
                                col: symbols[from_col],
                            },
                        },
                    );
                }
            }
        }
    }
}

fn fill_wildcard(
    matrix: &mut ScoreMatrix,
    extrema: Option<Extrema>,
    record: &mut impl FnMut(usize, usize, CellSource),
) {
    let Some(stop) = matrix.alphabet().index_of(Symbol::Stop) else {
        debug!("alphabet has no stop symbol; wildcard fallback skipped");
        return;
    };

    match extrema {
        Some(Extrema { min, .. }) => {
            let n = matrix.size();
            for row in 0..n {
                for col in 0..n {
                    if (row == stop || col == stop) && row != col && matrix.is_missing(row, col) {
                        matrix.set(row, col, min);
                        record(row, col, CellSource::WildcardMinimum);
                    }
                }
            }
        }
        None => warn!("matrix has no scores; stop row left without a minimum"),
    }

    if matrix.is_missing(stop, stop) {
        matrix.set(stop, stop, STOP_DIAGONAL_SCORE);
        record(stop, stop, CellSource::StopDiagonal);
    }
}
