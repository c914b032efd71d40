//! Shared types for amino-acid substitution scoring matrices.
//!
//! Every matrix handled by the workspace is keyed by a fixed canonical order
//! (`A R N D C Q E G H I L K M F P S T W Y V B Z X *`), regardless of the
//! column order a source file declares. [`Alphabet`] picks one of the two
//! canonical variants, [`Symbol`] is a single member, and [`ScoreMatrix`]
//! stores one optional score per `(row, col)` pair. A missing score is `None`,
//! so it can never be confused with a real value.
//!
//! ```rust
//! use scoremat_types::{Alphabet, ScoreMatrix, Symbol};
//!
//! let mut m = ScoreMatrix::empty(Alphabet::Blast);
//! m.set(Symbol::A.index(), Symbol::R.index(), -1);
//! assert_eq!(m.score(Symbol::A, Symbol::R), Some(-1));
//! assert_eq!(Symbol::from_char('J'), Some(Symbol::X));
//! ```

use std::fmt;

/// Value written by the legacy tools wherever a score was never resolved.
pub const LEGACY_MISSING: i32 = -999;

/// Canonical matrix symbol, declared in canonical order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    A,
    R,
    N,
    D,
    C,
    Q,
    E,
    G,
    H,
    I,
    L,
    K,
    M,
    F,
    P,
    S,
    T,
    W,
    Y,
    V,
    /// Asp or Asn.
    B,
    /// Glu or Gln.
    Z,
    /// Any residue. `J` and `O` resolve here too.
    X,
    /// Translation stop, `*`.
    Stop,
}

impl Symbol {
    /// All symbols in canonical order.
    pub const ALL: [Symbol; 24] = [
        Symbol::A,
        Symbol::R,
        Symbol::N,
        Symbol::D,
        Symbol::C,
        Symbol::Q,
        Symbol::E,
        Symbol::G,
        Symbol::H,
        Symbol::I,
        Symbol::L,
        Symbol::K,
        Symbol::M,
        Symbol::F,
        Symbol::P,
        Symbol::S,
        Symbol::T,
        Symbol::W,
        Symbol::Y,
        Symbol::V,
        Symbol::B,
        Symbol::Z,
        Symbol::X,
        Symbol::Stop,
    ];

    /// Resolve a header character to its canonical symbol.
    ///
    /// Only upper-case letters are recognised. `J` (Leu/Ile) and `O`
    /// (pyrrolysine) have no row of their own and are folded into the fully
    /// ambiguous `X`.
    pub fn from_char(c: char) -> Option<Self> {
        let sym = match c {
            'A' => Symbol::A,
            'R' => Symbol::R,
            'N' => Symbol::N,
            'D' => Symbol::D,
            'C' => Symbol::C,
            'Q' => Symbol::Q,
            'E' => Symbol::E,
            'G' => Symbol::G,
            'H' => Symbol::H,
            'I' => Symbol::I,
            'L' => Symbol::L,
            'K' => Symbol::K,
            'M' => Symbol::M,
            'F' => Symbol::F,
            'P' => Symbol::P,
            'S' => Symbol::S,
            'T' => Symbol::T,
            'W' => Symbol::W,
            'Y' => Symbol::Y,
            'V' => Symbol::V,
            'B' => Symbol::B,
            'Z' => Symbol::Z,
            'J' | 'O' | 'X' => Symbol::X,
            '*' => Symbol::Stop,
            _ => return None,
        };
        Some(sym)
    }

    /// Character used for this symbol in matrix headers.
    pub fn to_char(self) -> char {
        ALPHABET_CHARS[self.index()]
    }

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this is one of the 20 standard residues.
    pub fn is_standard(self) -> bool {
        self.index() < 20
    }
}

const ALPHABET_CHARS: [char; 24] = [
    'A', 'R', 'N', 'D', 'C', 'Q', 'E', 'G', 'H', 'I', 'L', 'K', 'M', 'F', 'P', 'S', 'T', 'W',
    'Y', 'V', 'B', 'Z', 'X', '*',
];

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Canonical alphabet variant used to index a matrix.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Alphabet {
    /// 24 symbols, including the stop `*`.
    Blast,
    /// 23 symbols, without the stop.
    Fasta,
}

impl Alphabet {
    /// Number of rows (and columns) of a matrix over this alphabet.
    pub fn size(self) -> usize {
        match self {
            Alphabet::Blast => 24,
            Alphabet::Fasta => 23,
        }
    }

    /// Member symbols in canonical order.
    pub fn symbols(self) -> &'static [Symbol] {
        &Symbol::ALL[..self.size()]
    }

    /// Canonical index of `sym`, or `None` when it is not a member.
    pub fn index_of(self, sym: Symbol) -> Option<usize> {
        let idx = sym.index();
        (idx < self.size()).then_some(idx)
    }

    pub fn symbol_at(self, idx: usize) -> Option<Symbol> {
        self.symbols().get(idx).copied()
    }

    /// Resolve a header character straight to a canonical index.
    pub fn resolve(self, c: char) -> Option<usize> {
        Symbol::from_char(c).and_then(|sym| self.index_of(sym))
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Alphabet::Blast => "blast",
            Alphabet::Fasta => "fasta",
        })
    }
}

/// `(row, col)` pair addressing one matrix cell by symbol.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Cell {
    pub row: Symbol,
    pub col: Symbol,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Square score table over a canonical [`Alphabet`], stored row-major.
///
/// Indices passed to the accessors are canonical indices and must be below
/// [`ScoreMatrix::size`]; out-of-range indices panic like slice indexing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScoreMatrix {
    alphabet: Alphabet,
    cells: Vec<Option<i32>>,
}

impl ScoreMatrix {
    /// A matrix with every cell missing.
    pub fn empty(alphabet: Alphabet) -> Self {
        let n = alphabet.size();
        Self {
            alphabet,
            cells: vec![None; n * n],
        }
    }

    /// Build a fully specified matrix from row-major scores.
    ///
    /// Returns `None` unless `scores` holds exactly `size * size` values.
    pub fn from_scores(alphabet: Alphabet, scores: &[i32]) -> Option<Self> {
        let n = alphabet.size();
        if scores.len() != n * n {
            return None;
        }
        Some(Self {
            alphabet,
            cells: scores.iter().copied().map(Some).collect(),
        })
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        self.cells[self.offset(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, score: i32) {
        let off = self.offset(row, col);
        self.cells[off] = Some(score);
    }

    pub fn is_missing(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_none()
    }

    /// Score addressed by symbol; `None` for missing cells or non-members.
    pub fn score(&self, row: Symbol, col: Symbol) -> Option<i32> {
        let r = self.alphabet.index_of(row)?;
        let c = self.alphabet.index_of(col)?;
        self.get(r, c)
    }

    /// One row of cells in canonical column order.
    pub fn row(&self, row: usize) -> &[Option<i32>] {
        let n = self.size();
        &self.cells[row * n..(row + 1) * n]
    }

    /// Present scores in row-major order.
    pub fn present_scores(&self) -> impl Iterator<Item = i32> + '_ {
        self.cells.iter().filter_map(|c| *c)
    }

    /// Cells that are still missing, in row-major order.
    pub fn missing_cells(&self) -> Vec<Cell> {
        let symbols = self.alphabet.symbols();
        let n = self.size();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(off, _)| Cell {
                row: symbols[off / n],
                col: symbols[off % n],
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        let n = self.size();
        assert!(row < n && col < n, "cell ({row},{col}) outside {n}x{n} matrix");
        row * n + col
    }
}
