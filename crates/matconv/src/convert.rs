//! Read, complete and render one matrix file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use scoremat_complete::{Completer, Completion, FallbackPolicy};
use scoremat_reader::{FileAlphabet, LoadReport, ParsedMatrix, ReadError, read_matrix_with_mode};
use scoremat_types::{Cell, LEGACY_MISSING};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, Format, prompt_for_path};
use crate::export::{PAIRWISE_X_DEFAULT, rendered_missing, write_full_matrix, write_pairwise};
use crate::histogram::Histogram;
use crate::report::DiagnosticsReport;

const UNRESOLVED_PREVIEW: usize = 8;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("{count} cells could not be filled and would print as {LEGACY_MISSING}: {preview}")]
    Unresolved { count: usize, preview: String },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

/// A parsed and completed matrix, ready to render.
#[derive(Debug)]
pub struct Conversion {
    /// Input name as given, echoed in the output banner.
    pub source: String,
    pub format: Format,
    pub policy: FallbackPolicy,
    pub comments: Vec<String>,
    pub mapping: FileAlphabet,
    pub report: LoadReport,
    pub completion: Completion,
}

impl Conversion {
    pub fn from_parsed(parsed: ParsedMatrix, source: impl Into<String>, format: Format) -> Self {
        let completer = Completer::for_alphabet(format.alphabet());
        let ParsedMatrix {
            comments,
            mapping,
            matrix,
            report,
        } = parsed;
        Self {
            source: source.into(),
            format,
            policy: completer.policy(),
            comments,
            mapping,
            report,
            completion: completer.complete(matrix),
        }
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let matrix = &self.completion.matrix;
        match self.format {
            Format::Blast => write_full_matrix(out, &self.source, &self.comments, matrix),
            Format::Fasta => write_pairwise(out, &self.source, matrix),
        }
    }

    /// Split unresolved cells into those printed as [`LEGACY_MISSING`] and
    /// those the layout gives a default score.
    pub fn unresolved_by_rendering(&self) -> (Vec<Cell>, Vec<Cell>) {
        self.completion
            .unresolved
            .iter()
            .partition(|cell| rendered_missing(self.format, **cell) == LEGACY_MISSING)
    }

    pub fn histogram(&self) -> Histogram {
        Histogram::half_matrix(&self.completion.matrix)
    }
}

/// Convert `path` according to `config`.
///
/// The rendered matrix goes to `out` in a single write once every check has
/// passed; histogram and JSON diagnostics go to `diag`.
pub fn convert<W: Write, D: Write>(
    config: &Config,
    path: &Path,
    out: &mut W,
    diag: &mut D,
) -> Result<Conversion, ConvertError> {
    let parsed = read_matrix_with_mode(path, config.format.alphabet(), config.load_mode)?;
    let conversion = Conversion::from_parsed(parsed, path.display().to_string(), config.format);

    let (sentinel, defaulted) = conversion.unresolved_by_rendering();
    if config.strict && !sentinel.is_empty() {
        return Err(ConvertError::Unresolved {
            count: sentinel.len(),
            preview: preview(&sentinel),
        });
    }
    for cell in &sentinel {
        warn!("no score for {cell}, writing {LEGACY_MISSING}");
    }
    if !defaulted.is_empty() {
        warn!(
            "{} cells touching X have no score, defaulted to {PAIRWISE_X_DEFAULT}",
            defaulted.len()
        );
        for cell in &defaulted {
            debug!("no score for {cell}, defaulted to {PAIRWISE_X_DEFAULT}");
        }
    }

    let mut rendered = Vec::new();
    conversion.render(&mut rendered)?;
    out.write_all(&rendered)?;
    out.flush()?;

    if config.histogram {
        conversion.histogram().write_to(diag)?;
    }
    if config.report_json {
        let report = DiagnosticsReport::from_conversion(&conversion);
        serde_json::to_writer_pretty(&mut *diag, &report).map_err(io::Error::from)?;
        writeln!(diag)?;
    }
    diag.flush()?;

    Ok(conversion)
}

fn preview(cells: &[Cell]) -> String {
    let mut shown: Vec<String> = cells
        .iter()
        .take(UNRESOLVED_PREVIEW)
        .map(|c| c.to_string())
        .collect();
    if cells.len() > UNRESOLVED_PREVIEW {
        shown.push("...".to_string());
    }
    shown.join(" ")
}

/// Resolve the input path (prompting if needed) and convert to stdout.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let path = match &config.matrix_path {
        Some(path) => path.clone(),
        None => ask_for_path()?,
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    let conversion = convert(config, &path, &mut stdout.lock(), &mut stderr.lock())
        .with_context(|| format!("converting {}", path.display()))?;

    info!(
        "wrote {} matrix from {} ({} cells unresolved)",
        conversion.format.alphabet(),
        conversion.source,
        conversion.completion.unresolved.len()
    );
    Ok(())
}

fn ask_for_path() -> anyhow::Result<PathBuf> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt_for_path(&mut stdin.lock(), &mut stdout)
        .context("failed to read matrix file name")?
        .ok_or_else(|| anyhow!("no scoring matrix file given"))
}

#[cfg(test)]
pub(crate) fn convert_str(text: &str, source: &str, format: Format) -> Conversion {
    let parsed = scoremat_reader::parse_str(text, format.alphabet()).unwrap();
    Conversion::from_parsed(parsed, source, format)
}
