use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use scoremat_reader::{LoadMode, read_matrix_with_mode};
use scoremat_types::Alphabet;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p scoremat-reader --example stats -- <matrix-file>")?;

    for alphabet in [Alphabet::Blast, Alphabet::Fasta] {
        let parsed = read_matrix_with_mode(&path, alphabet, LoadMode::Mmap)
            .with_context(|| format!("reading {}", path.display()))?;

        println!("Alphabet {alphabet} ({} symbols)", alphabet.size());
        println!("  Comment lines   : {}", parsed.comments.len());
        println!("  Header positions: {}", parsed.mapping.len());
        let undeclared: String = parsed
            .mapping
            .undeclared()
            .iter()
            .map(|s| s.to_char())
            .collect();
        println!("  Undeclared      : {undeclared:?}");
        println!("  Rows seen       : {}", parsed.report.rows_seen);
        println!("  Rows ignored    : {}", parsed.report.rows_ignored);
        println!("  Values stored   : {}", parsed.report.values_stored);
        println!("  Values discarded: {}", parsed.report.values_discarded);
        println!("  Tokens skipped  : {}", parsed.report.tokens_skipped);
        println!("  Overwrites      : {}", parsed.report.cells_overwritten);
        println!("  Missing cells   : {}", parsed.matrix.missing_cells().len());
    }

    Ok(())
}
