use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use scoremat_complete::{CellSource, Completer};
use scoremat_reader::{LoadMode, read_matrix_with_mode};
use scoremat_types::Alphabet;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args.next().map(PathBuf::from).context(
        "usage: cargo run -p scoremat-complete --example inspect -- <matrix-file> [blast|fasta]",
    )?;
    let alphabet = match args.next().as_deref() {
        None | Some("blast") => Alphabet::Blast,
        Some("fasta") => Alphabet::Fasta,
        Some(other) => bail!("unknown alphabet {other:?}, expected blast or fasta"),
    };

    let parsed = read_matrix_with_mode(&path, alphabet, LoadMode::Mmap)
        .with_context(|| format!("reading {}", path.display()))?;
    let completer = Completer::for_alphabet(alphabet);
    let done = completer.complete(parsed.matrix);

    println!("Matrix: {} ({alphabet})", path.display());
    println!("Policy: {:?}", completer.policy());
    if let Some(ext) = done.extrema {
        println!("Scores: min {} max {}", ext.min, ext.max);
    }
    let rows = [
        ("loaded", done.count_sources(|s| *s == CellSource::Loaded)),
        ("mirrored", done.count_sources(|s| *s == CellSource::Mirrored)),
        (
            "ambiguity copies",
            done.count_sources(|s| matches!(s, CellSource::AmbiguityCopy { .. })),
        ),
        (
            "stop minimum",
            done.count_sources(|s| *s == CellSource::WildcardMinimum),
        ),
        (
            "stop diagonal",
            done.count_sources(|s| *s == CellSource::StopDiagonal),
        ),
    ];
    for (label, count) in rows {
        println!("  {label:<17}{count}");
    }
    for cell in &done.unresolved {
        println!("  unresolved {cell}");
    }

    Ok(())
}
