//! Read text-encoded substitution matrices into canonical order.
//!
//! Source files declare their own column order on the first non-comment
//! line, so parsing happens in two steps:
//!
//! 1. [`FileAlphabet::parse_header`] maps every alphabetic position of the
//!    header line to a canonical index (or to "unmapped").
//! 2. [`load_rows`] walks the data rows and places each numeric token into
//!    `matrix[mapping[row]][mapping[col]]`.
//!
//! Parsing is deliberately lenient: row labels, stray text, unmapped rows
//! and surplus columns are skipped, never rejected. Everything skipped is
//! counted in a [`LoadReport`] so callers can surface it. Only a missing or
//! letterless header line (and I/O failures) abort the read.
//!
//! # Example
//! ```no_run
//! use scoremat_reader::{LoadMode, read_matrix_with_mode};
//! use scoremat_types::{Alphabet, Symbol};
//!
//! # fn main() -> anyhow::Result<()> {
//! let parsed = read_matrix_with_mode("blosum62.iij", Alphabet::Blast, LoadMode::Owned)?;
//! println!("W/W = {:?}", parsed.matrix.score(Symbol::W, Symbol::W));
//! println!("skipped tokens: {}", parsed.report.tokens_skipped);
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p scoremat-reader --example stats -- <file>`.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use bitvec::prelude::*;
use memmap2::Mmap;
use scoremat_types::{Alphabet, ScoreMatrix, Symbol};
use thiserror::Error;
use tracing::{debug, info};

/// Strategy for loading the matrix file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file.
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("input has no alphabet line")]
    MissingHeader,
    #[error("first non-comment line must contain alphabet, got {line:?}")]
    Alphabet { line: String },
}

/// Column order declared by a file's header line.
///
/// Holds one entry per alphabetic character of the header, in order. Entries
/// for letters outside the target alphabet are `None`; they still occupy a
/// position so later rows stay aligned.
#[derive(Clone, Debug)]
pub struct FileAlphabet {
    alphabet: Alphabet,
    positions: Vec<Option<usize>>,
    declared: BitVec,
}

impl FileAlphabet {
    /// Build the position mapping from a header line.
    ///
    /// Fails with [`ReadError::Alphabet`] when the line has no `A`, which
    /// usually means a data row was mistaken for the header.
    pub fn parse_header(line: &str, alphabet: Alphabet) -> Result<Self, ReadError> {
        if !line.contains('A') {
            return Err(ReadError::Alphabet {
                line: line.trim_end().to_string(),
            });
        }

        let mut positions = Vec::new();
        let mut declared = bitvec![0; alphabet.size()];
        for ch in line.chars() {
            if let Some(idx) = alphabet.resolve(ch) {
                positions.push(Some(idx));
                declared.set(idx, true);
            } else if ch.is_ascii_alphabetic() {
                positions.push(None);
            }
        }

        Ok(Self {
            alphabet,
            positions,
            declared,
        })
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Number of alphabetic positions on the header line.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Canonical index for a file position; `None` if unmapped or past the end.
    pub fn position(&self, idx: usize) -> Option<usize> {
        self.positions.get(idx).copied().flatten()
    }

    pub fn positions(&self) -> &[Option<usize>] {
        &self.positions
    }

    /// Whether the header named `sym` at least once.
    pub fn is_declared(&self, sym: Symbol) -> bool {
        self.alphabet
            .index_of(sym)
            .is_some_and(|idx| self.declared[idx])
    }

    /// Canonical symbols the header never named.
    pub fn undeclared(&self) -> Vec<Symbol> {
        self.declared
            .iter_zeros()
            .filter_map(|idx| self.alphabet.symbol_at(idx))
            .collect()
    }
}

/// Counters describing what the loader kept and what it skipped.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LoadReport {
    /// Non-empty lines after the header, each one an alphabet row.
    pub rows_seen: usize,
    /// Rows whose header position was unmapped or beyond the header.
    pub rows_ignored: usize,
    /// Numeric values written into the matrix.
    pub values_stored: usize,
    /// Numeric values dropped for landing on an unmapped column or row.
    pub values_discarded: usize,
    /// Non-numeric tokens (row labels, stray text).
    pub tokens_skipped: usize,
    /// Writes that replaced an earlier value for the same cell.
    pub cells_overwritten: usize,
}

/// Everything recovered from one matrix file.
#[derive(Clone, Debug)]
pub struct ParsedMatrix {
    /// Leading `#`/`>` lines, without their line terminators.
    pub comments: Vec<String>,
    pub mapping: FileAlphabet,
    pub matrix: ScoreMatrix,
    pub report: LoadReport,
}

/// Read a matrix file, memory-mapping it.
pub fn read_matrix(path: impl AsRef<Path>, alphabet: Alphabet) -> Result<ParsedMatrix, ReadError> {
    read_matrix_with_mode(path, alphabet, LoadMode::Mmap)
}

/// Read a matrix file choosing between mmap and an owned buffer.
pub fn read_matrix_with_mode(
    path: impl AsRef<Path>,
    alphabet: Alphabet,
    mode: LoadMode,
) -> Result<ParsedMatrix, ReadError> {
    let path = path.as_ref();
    let buffer = load_file(path, mode)?;
    let parsed = parse_bytes(buffer.as_slice(), alphabet)?;
    info!(
        "read {} values for {} alphabet from {}",
        parsed.report.values_stored,
        alphabet,
        path.display()
    );
    Ok(parsed)
}

/// Parse an in-memory matrix file.
pub fn parse_str(text: &str, alphabet: Alphabet) -> Result<ParsedMatrix, ReadError> {
    parse_bytes(text.as_bytes(), alphabet)
}

/// Parse raw file bytes. Invalid UTF-8 is replaced, which only ever turns the
/// affected tokens into skipped non-numeric text.
pub fn parse_bytes(bytes: &[u8], alphabet: Alphabet) -> Result<ParsedMatrix, ReadError> {
    let mut lines = bytes
        .split(|b| *b == b'\n')
        .map(|raw| String::from_utf8_lossy(strip_cr(raw)));

    let mut comments = Vec::new();
    let mut header: Option<Cow<'_, str>> = None;
    for line in lines.by_ref() {
        if line.starts_with('#') || line.starts_with('>') {
            comments.push(line.into_owned());
        } else if !line.trim().is_empty() {
            header = Some(line);
            break;
        }
    }
    let header = header.ok_or(ReadError::MissingHeader)?;
    let mapping = FileAlphabet::parse_header(&header, alphabet)?;
    debug!(
        "header declares {} positions; undeclared symbols: {:?}",
        mapping.len(),
        mapping.undeclared()
    );

    let (matrix, report) = load_rows(ScoreMatrix::empty(alphabet), &mapping, lines);
    Ok(ParsedMatrix {
        comments,
        mapping,
        matrix,
        report,
    })
}

/// Place the numeric tokens of each data row into `matrix`.
///
/// `lines` are the lines following the header, without terminators. The
/// matrix is consumed and handed back populated; cells no row wrote stay
/// missing. `mapping` must have been built for the matrix's alphabet.
pub fn load_rows<I>(
    mut matrix: ScoreMatrix,
    mapping: &FileAlphabet,
    lines: I,
) -> (ScoreMatrix, LoadReport)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    debug_assert_eq!(mapping.alphabet(), matrix.alphabet());
    let mut report = LoadReport::default();

    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        let file_row = report.rows_seen;
        report.rows_seen += 1;

        let row = mapping.position(file_row);
        if row.is_none() {
            report.rows_ignored += 1;
            debug!("row {} has no canonical symbol; ignoring its values", file_row + 1);
        }

        let mut file_col = 0usize;
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            if !is_score_token(token) {
                report.tokens_skipped += 1;
                continue;
            }
            let col = mapping.position(file_col);
            file_col += 1;

            match (row, col) {
                (Some(r), Some(c)) => {
                    if !matrix.is_missing(r, c) {
                        report.cells_overwritten += 1;
                    }
                    matrix.set(r, c, atoi(token));
                    report.values_stored += 1;
                }
                _ => report.values_discarded += 1,
            }
        }
    }

    debug!(?report, "matrix rows loaded");
    (matrix, report)
}

/// A score token is made only of signs and digits.
fn is_score_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| matches!(b, b'+' | b'-' | b'0'..=b'9'))
}

/// C `atoi` reading: optional sign, then leading digits; no digits reads as 0.
/// Saturates at the `i32` bounds.
fn atoi(token: &str) -> i32 {
    let bytes = token.as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    let limit = i64::from(i32::MAX) + 1;
    let magnitude = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| (acc * 10 + i64::from(b - b'0')).min(limit));
    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer, ReadError> {
    let open = |path: &Path| {
        File::open(path).map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })
    };
    let read_err = |source| ReadError::Read {
        path: path.to_path_buf(),
        source,
    };

    match mode {
        LoadMode::Mmap => {
            let file = open(path)?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .map_err(read_err)
        }
        LoadMode::Owned => {
            let mut file = open(path)?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).map_err(read_err)?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLAST_HEADER: &str = "   A  R  N  D  C  Q  E  G  H  I  L  K  M  F  P  S  T  W  Y  V  B  Z  X  *";

    #[test]
    fn header_maps_canonical_order() {
        let mapping = FileAlphabet::parse_header(BLAST_HEADER, Alphabet::Blast).unwrap();
        assert_eq!(mapping.len(), 24);
        for idx in 0..24 {
            assert_eq!(mapping.position(idx), Some(idx));
        }
        assert!(mapping.undeclared().is_empty());
    }

    #[test]
    fn header_keeps_first_occurrence_order() {
        let mapping = FileAlphabet::parse_header("R,A;V 1 W", Alphabet::Fasta).unwrap();
        assert_eq!(
            mapping.positions(),
            &[
                Some(Symbol::R.index()),
                Some(Symbol::A.index()),
                Some(Symbol::V.index()),
                Some(Symbol::W.index()),
            ]
        );
    }

    #[test]
    fn header_unknown_letters_hold_a_position() {
        let mapping = FileAlphabet::parse_header("A U R", Alphabet::Blast).unwrap();
        assert_eq!(mapping.positions(), &[Some(0), None, Some(1)]);
        assert!(mapping.is_declared(Symbol::R));
        assert!(!mapping.is_declared(Symbol::N));
    }

    #[test]
    fn header_merges_ambiguous_letters() {
        let mapping = FileAlphabet::parse_header("A J O X", Alphabet::Fasta).unwrap();
        let x = Symbol::X.index();
        assert_eq!(mapping.positions(), &[Some(0), Some(x), Some(x), Some(x)]);
    }

    #[test]
    fn fasta_header_ignores_stop() {
        let mapping = FileAlphabet::parse_header(BLAST_HEADER, Alphabet::Fasta).unwrap();
        assert_eq!(mapping.len(), 23);
        assert!(!mapping.is_declared(Symbol::Stop));
    }

    #[test]
    fn header_without_a_is_rejected() {
        let err = FileAlphabet::parse_header(" 4 -1 -2", Alphabet::Blast).unwrap_err();
        assert!(matches!(err, ReadError::Alphabet { .. }));
    }

    #[test]
    fn numeric_tokens() {
        assert!(is_score_token("-4"));
        assert!(is_score_token("+11"));
        assert!(is_score_token("3-4"));
        assert!(!is_score_token("A"));
        assert!(!is_score_token("1.5"));
        assert_eq!(atoi("-4"), -4);
        assert_eq!(atoi("+11"), 11);
        assert_eq!(atoi("3-4"), 3);
        assert_eq!(atoi("-"), 0);
        assert_eq!(atoi("+-3"), 0);
        assert_eq!(atoi("99999999999"), i32::MAX);
        assert_eq!(atoi("-99999999999"), i32::MIN);
    }

    #[test]
    fn rows_skip_labels_and_blank_lines() {
        let mapping = FileAlphabet::parse_header("A R N", Alphabet::Fasta).unwrap();
        let lines = ["A 4 -1 -2", "", "R, -1, 5, 0", "N -2 0 6"];
        let (m, report) = load_rows(ScoreMatrix::empty(Alphabet::Fasta), &mapping, lines);
        assert_eq!(m.score(Symbol::A, Symbol::A), Some(4));
        assert_eq!(m.score(Symbol::R, Symbol::A), Some(-1));
        assert_eq!(m.score(Symbol::N, Symbol::N), Some(6));
        assert_eq!(report.rows_seen, 3);
        assert_eq!(report.tokens_skipped, 3);
        assert_eq!(report.values_stored, 9);
    }

    #[test]
    fn unmapped_row_still_counts() {
        let mapping = FileAlphabet::parse_header("A U R", Alphabet::Fasta).unwrap();
        let lines = ["4 7 -1", "9 9 9", "-1 7 5"];
        let (m, report) = load_rows(ScoreMatrix::empty(Alphabet::Fasta), &mapping, lines);
        assert_eq!(m.score(Symbol::A, Symbol::R), Some(-1));
        assert_eq!(m.score(Symbol::R, Symbol::R), Some(5));
        assert_eq!(report.rows_ignored, 1);
        // Column U in rows A and R, plus the whole U row.
        assert_eq!(report.values_discarded, 5);
    }

    #[test]
    fn surplus_rows_and_columns_are_discarded() {
        let mapping = FileAlphabet::parse_header("A R", Alphabet::Fasta).unwrap();
        let lines = ["1 2 3", "2 1", "7 7"];
        let (m, report) = load_rows(ScoreMatrix::empty(Alphabet::Fasta), &mapping, lines);
        assert_eq!(m.score(Symbol::A, Symbol::R), Some(2));
        assert_eq!(report.rows_ignored, 1);
        assert_eq!(report.values_discarded, 3);
    }

    #[test]
    fn mapped_positions_stay_inside_the_matrix() {
        let mapping = FileAlphabet::parse_header(BLAST_HEADER, Alphabet::Fasta).unwrap();
        assert!(mapping.positions().iter().flatten().all(|idx| *idx < 23));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn mapping_for_another_alphabet_is_rejected() {
        let mapping = FileAlphabet::parse_header("A *", Alphabet::Blast).unwrap();
        let _ = load_rows(ScoreMatrix::empty(Alphabet::Fasta), &mapping, ["1 2"]);
    }

    #[test]
    fn last_write_wins() {
        let mapping = FileAlphabet::parse_header("A X J", Alphabet::Fasta).unwrap();
        let lines = ["1 2 3"];
        let (m, report) = load_rows(ScoreMatrix::empty(Alphabet::Fasta), &mapping, lines);
        assert_eq!(m.score(Symbol::A, Symbol::X), Some(3));
        assert_eq!(report.cells_overwritten, 1);
    }

    #[test]
    fn whitespace_only_line_occupies_a_row() {
        let mapping = FileAlphabet::parse_header("A R", Alphabet::Fasta).unwrap();
        let lines = ["   ", "-1 5"];
        let (m, _) = load_rows(ScoreMatrix::empty(Alphabet::Fasta), &mapping, lines);
        assert_eq!(m.score(Symbol::A, Symbol::A), None);
        assert_eq!(m.score(Symbol::R, Symbol::R), Some(5));
    }

    #[test]
    fn parse_collects_comments_and_handles_crlf() {
        let text = "# BLOSUM test\r\n> second\r\n\r\nA R\r\n4\r\n-1 5\r\n";
        let parsed = parse_str(text, Alphabet::Blast).unwrap();
        assert_eq!(parsed.comments, vec!["# BLOSUM test", "> second"]);
        assert_eq!(parsed.matrix.score(Symbol::A, Symbol::A), Some(4));
        assert_eq!(parsed.matrix.score(Symbol::R, Symbol::R), Some(5));
        assert_eq!(parsed.report.rows_seen, 2);
    }

    #[test]
    fn parse_requires_header() {
        let err = parse_str("# only comments\n\n", Alphabet::Blast).unwrap_err();
        assert!(matches!(err, ReadError::MissingHeader));
        let err = parse_str("# c\n 1 2 3\nA\n", Alphabet::Blast).unwrap_err();
        assert!(matches!(err, ReadError::Alphabet { .. }));
    }

    #[test]
    fn invalid_utf8_tokens_are_skipped() {
        let bytes = b"A R\n4 \xff -1\n-1 5\n";
        let parsed = parse_bytes(bytes, Alphabet::Fasta).unwrap();
        assert_eq!(parsed.matrix.score(Symbol::A, Symbol::R), Some(-1));
        assert_eq!(parsed.report.tokens_skipped, 1);
    }
}
