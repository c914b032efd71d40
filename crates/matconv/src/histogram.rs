//! Score distribution over the upper half of the standard-residue block.

use std::io::{self, Write};

use scoremat_types::{ScoreMatrix, Symbol};

pub const HISTOGRAM_MIN: i32 = -8;
pub const HISTOGRAM_MAX: i32 = 17;

/// Bucket counts for scores in `HISTOGRAM_MIN..=HISTOGRAM_MAX`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Histogram {
    buckets: Vec<usize>,
    total: usize,
}

impl Histogram {
    /// Count `(row, col)` with `col >= row` over the 20 standard residues.
    /// Missing and out-of-range scores are left out.
    pub fn half_matrix(matrix: &ScoreMatrix) -> Self {
        let mut buckets = vec![0usize; (HISTOGRAM_MAX - HISTOGRAM_MIN + 1) as usize];
        let mut total = 0usize;
        let standard: Vec<Symbol> = Symbol::ALL.into_iter().filter(|s| s.is_standard()).collect();
        for (i, row) in standard.iter().enumerate() {
            for col in &standard[i..] {
                if let Some(score) = matrix.score(*row, *col)
                    && (HISTOGRAM_MIN..=HISTOGRAM_MAX).contains(&score)
                {
                    buckets[(score - HISTOGRAM_MIN) as usize] += 1;
                    total += 1;
                }
            }
        }
        Self { buckets, total }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, score: i32) -> usize {
        if (HISTOGRAM_MIN..=HISTOGRAM_MAX).contains(&score) {
            self.buckets[(score - HISTOGRAM_MIN) as usize]
        } else {
            0
        }
    }

    /// First score at which the running count reaches half the total.
    pub fn median(&self) -> Option<i32> {
        if self.total == 0 {
            return None;
        }
        let half = self.total / 2;
        let mut running = 0usize;
        for (idx, count) in self.buckets.iter().enumerate() {
            running += count;
            if running >= half {
                return Some(HISTOGRAM_MIN + idx as i32);
            }
        }
        None
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Half matrix histogram, number of scores={}", self.total)?;
        for (idx, count) in self.buckets.iter().enumerate() {
            let score = HISTOGRAM_MIN + idx as i32;
            writeln!(out, "{score:3}={count:3} {}", "X".repeat(*count))?;
        }
        match self.median() {
            Some(median) => writeln!(out, "Median score={median}"),
            None => writeln!(out, "Median score=n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoremat_types::Alphabet;

    #[test]
    fn counts_upper_half_of_standard_block() {
        let m = ScoreMatrix::from_scores(Alphabet::Blast, &[1; 24 * 24]).unwrap();
        let hist = Histogram::half_matrix(&m);
        assert_eq!(hist.total(), 20 * 21 / 2);
        assert_eq!(hist.count(1), 210);
        assert_eq!(hist.median(), Some(1));
    }

    #[test]
    fn skips_missing_and_out_of_range() {
        let mut m = ScoreMatrix::empty(Alphabet::Fasta);
        m.set(0, 0, 4);
        m.set(0, 1, -1);
        m.set(1, 0, 99);
        m.set(1, 1, 30);
        m.set(2, 2, -2);
        let hist = Histogram::half_matrix(&m);
        assert_eq!(hist.total(), 3);
        assert_eq!(hist.median(), Some(-2));
        assert_eq!(hist.count(30), 0);
    }

    #[test]
    fn renders_bars() {
        let mut m = ScoreMatrix::empty(Alphabet::Fasta);
        m.set(0, 0, 4);
        m.set(1, 1, 4);
        let mut buf = Vec::new();
        Histogram::half_matrix(&m).write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Half matrix histogram, number of scores=2\n"));
        assert!(text.contains("\n -8=  0 \n"));
        assert!(text.contains("\n  4=  2 XX\n"));
        assert!(text.ends_with("Median score=4\n"));
        assert!(Histogram::half_matrix(&ScoreMatrix::empty(Alphabet::Fasta)).median().is_none());
    }
}
