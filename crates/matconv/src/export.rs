//! Text layouts for completed matrices.
//!
//! Exporters only render: they never symmetrize or apply fallbacks. A cell
//! that is still missing renders as [`LEGACY_MISSING`], except in the
//! pairwise layout where missing `X` cells render as [`PAIRWISE_X_DEFAULT`].

use std::io::{self, Write};

use scoremat_types::{Alphabet, Cell, LEGACY_MISSING, ScoreMatrix, Symbol};

use crate::config::Format;

/// Gap open and extend penalties written into every pairwise file.
pub const GAP_OPEN: i32 = -12;
pub const GAP_EXTEND: i32 = -4;

/// Score for an unresolved cell touching `X` in the pairwise layout.
pub const PAIRWISE_X_DEFAULT: i32 = -1;

const PAIRWISE_STATS: &str = " 4 27 200 5 2 50 2";
const PAIRWISE_RESIDUES: &str = "A R N D C Q E G H I L  K  M  F  P  S  T  W  Y  V  B Z X J";
const PAIRWISE_REMAP: &str = "0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 3 6 0 0";

/// Write the full square matrix in the BLAST layout.
///
/// `comments` are the input's leading comment lines, echoed after the banner.
pub fn write_full_matrix<W: Write>(
    out: &mut W,
    source: &str,
    comments: &[String],
    matrix: &ScoreMatrix,
) -> io::Result<()> {
    writeln!(out, "#  Matrix made by matblas from {source}")?;
    writeln!(out, "#  * column uses minimum score")?;
    for line in comments {
        writeln!(out, "{line}")?;
    }

    let header: Vec<String> = matrix
        .alphabet()
        .symbols()
        .iter()
        .map(|s| format!("{:>2}", s.to_char()))
        .collect();
    writeln!(out, "{}", header.join(" "))?;

    for row in 0..matrix.size() {
        for cell in matrix.row(row) {
            write!(out, "{:2} ", cell.unwrap_or(LEGACY_MISSING))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the lower triangle in the legacy FASTA pairwise layout.
///
/// Rows and columns follow the 23-symbol alphabet whatever alphabet the
/// matrix was built with. A trailing `J` row repeats the `X` row.
pub fn write_pairwise<W: Write>(out: &mut W, source: &str, matrix: &ScoreMatrix) -> io::Result<()> {
    writeln!(out, ";P {source}")?;
    writeln!(out, "{PAIRWISE_STATS}")?;
    writeln!(out, " {GAP_OPEN} {GAP_EXTEND}")?;
    writeln!(out, "@ *")?;
    writeln!(out, "{PAIRWISE_RESIDUES}")?;
    writeln!(out, "{PAIRWISE_REMAP}")?;

    let symbols = Alphabet::Fasta.symbols();
    for (i, row) in symbols.iter().enumerate() {
        for col in &symbols[..=i] {
            write!(out, "{:2} ", pairwise_score(matrix, *row, *col))?;
        }
        writeln!(out)?;
    }

    for col in symbols {
        write!(out, "{:2} ", pairwise_score(matrix, Symbol::X, *col))?;
    }
    writeln!(out, "{:2}", pairwise_score(matrix, Symbol::X, Symbol::X))?;
    Ok(())
}

/// Value an unresolved `cell` prints as in the layout for `format`.
pub fn rendered_missing(format: Format, cell: Cell) -> i32 {
    match format {
        Format::Fasta if cell.row == Symbol::X || cell.col == Symbol::X => PAIRWISE_X_DEFAULT,
        _ => LEGACY_MISSING,
    }
}

fn pairwise_score(matrix: &ScoreMatrix, row: Symbol, col: Symbol) -> i32 {
    matrix
        .score(row, col)
        .unwrap_or_else(|| rendered_missing(Format::Fasta, Cell { row, col }))
}
