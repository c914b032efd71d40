use std::io::Write;
use std::path::PathBuf;

use scoremat_reader::{LoadMode, ReadError, read_matrix, read_matrix_with_mode};
use scoremat_types::{Alphabet, Symbol};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn reads_full_blast_matrix() {
    let parsed = read_matrix(fixture("blosum62.txt"), Alphabet::Blast).expect("load fixture");
    assert_eq!(parsed.comments.len(), 6);
    assert!(parsed.comments[0].starts_with("#  Matrix made by matblas"));
    assert_eq!(parsed.mapping.len(), 24);
    assert!(parsed.matrix.is_complete());
    assert_eq!(parsed.report.rows_seen, 24);
    assert_eq!(parsed.report.values_stored, 24 * 24);
    assert_eq!(parsed.report.tokens_skipped, 24);
    assert_eq!(parsed.matrix.score(Symbol::W, Symbol::W), Some(11));
    assert_eq!(parsed.matrix.score(Symbol::A, Symbol::Stop), Some(-4));
    assert_eq!(parsed.matrix.score(Symbol::Stop, Symbol::Stop), Some(1));
}

#[test]
fn fasta_alphabet_drops_stop_row_and_column() {
    let parsed = read_matrix_with_mode(fixture("blosum62.txt"), Alphabet::Fasta, LoadMode::Owned)
        .expect("load fixture");
    assert_eq!(parsed.mapping.len(), 23);
    assert!(parsed.matrix.is_complete());
    // 23 stop-column values plus the 24 values of the stop row.
    assert_eq!(parsed.report.values_discarded, 23 + 24);
    assert_eq!(parsed.report.rows_ignored, 1);
}

#[test]
fn reads_permuted_lower_triangle() {
    let parsed = read_matrix(fixture("lower_permuted.txt"), Alphabet::Fasta).expect("load fixture");
    let m = &parsed.matrix;
    assert_eq!(parsed.comments, vec!["> lower triangle, W first"]);

    // W leads; the rest keep canonical order.
    let mut expected: Vec<Option<usize>> = vec![Some(Symbol::W.index())];
    expected.extend((0..=16).map(Some));
    expected.extend((18..=22).map(Some));
    assert_eq!(parsed.mapping.positions(), expected.as_slice());
    let mut seen: Vec<usize> = parsed.mapping.positions().iter().flatten().copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..23).collect::<Vec<_>>());
    assert!(parsed.mapping.undeclared().is_empty());

    assert_eq!(m.score(Symbol::W, Symbol::W), Some(11));
    assert_eq!(m.score(Symbol::A, Symbol::W), Some(-3));
    assert_eq!(m.score(Symbol::W, Symbol::A), None);
    assert_eq!(m.score(Symbol::Y, Symbol::W), Some(2));
    assert_eq!(m.score(Symbol::X, Symbol::X), Some(-1));
    assert_eq!(m.missing_cells().len(), 23 * 22 / 2);
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_matrix(dir.path().join("nope.txt"), Alphabet::Blast).unwrap_err();
    assert!(matches!(err, ReadError::Open { .. }));
    assert!(err.to_string().contains("nope.txt"));
}

#[test]
fn header_without_alphabet_fails_in_both_modes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# comment").unwrap();
    writeln!(file, " 4 -1 -2").unwrap();
    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let err = read_matrix_with_mode(file.path(), Alphabet::Blast, mode).unwrap_err();
        assert!(matches!(err, ReadError::Alphabet { .. }), "{mode:?}: {err}");
    }
}

#[test]
fn empty_file_has_no_header() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = read_matrix_with_mode(file.path(), Alphabet::Fasta, LoadMode::Owned).unwrap_err();
    assert!(matches!(err, ReadError::MissingHeader));
}
