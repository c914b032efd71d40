use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use scoremat_reader::LoadMode;
use scoremat_types::Alphabet;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";
const DEFAULT_LOAD_MODE: LoadMode = LoadMode::Mmap;
const PROMPT: &str = "\nEnter name of file containing scoring matrix: ";

/// Output layout produced by a converter binary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// Full square matrix with the stop column (`matblas`).
    Blast,
    /// Lower-triangle pairwise file (`matfas`).
    Fasta,
}

impl Format {
    pub fn alphabet(self) -> Alphabet {
        match self {
            Format::Blast => Alphabet::Blast,
            Format::Fasta => Alphabet::Fasta,
        }
    }
}

/// Flags shared by both converters.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct CommonArgs {
    /// Scoring matrix file to convert; prompts for one when omitted.
    pub path: Option<PathBuf>,
    /// How to read the input file: `mmap` or `owned`.
    #[arg(long, value_parser = parse_load_mode_arg)]
    pub load_mode: Option<LoadMode>,
    /// Fail instead of printing cells no rule could fill.
    #[arg(long)]
    pub strict: bool,
    /// Print the half-matrix score histogram to stderr.
    #[arg(long)]
    pub histogram: bool,
    /// Print a JSON diagnostics report to stderr.
    #[arg(long)]
    pub report_json: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub format: Format,
    pub matrix_path: Option<PathBuf>,
    pub load_mode: LoadMode,
    pub strict: bool,
    pub histogram: bool,
    pub report_json: bool,
}

/// Merge command-line flags with `MATCONV_*` environment variables.
pub fn load_config(format: Format, args: CommonArgs) -> Config {
    load_config_with(format, args, |key| env::var(key).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with(
    format: Format,
    args: CommonArgs,
    var: impl Fn(&str) -> Option<String>,
) -> Config {
    let matrix_path = args
        .path
        .or_else(|| var("MATCONV_MATRIX").filter(|p| !p.is_empty()).map(PathBuf::from));
    let load_mode = args
        .load_mode
        .or_else(|| var("MATCONV_LOAD_MODE").as_deref().and_then(parse_load_mode))
        .unwrap_or(DEFAULT_LOAD_MODE);
    let strict = args.strict || var("MATCONV_STRICT").as_deref().is_some_and(parse_flag);

    Config {
        format,
        matrix_path,
        load_mode,
        strict,
        histogram: args.histogram,
        report_json: args.report_json,
    }
}

pub fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn parse_load_mode_arg(raw: &str) -> Result<LoadMode, String> {
    parse_load_mode(raw).ok_or_else(|| format!("unknown load mode {raw:?} (expected mmap or owned)"))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Ask for a matrix file name on `output` and read one line from `input`.
///
/// Returns `None` on end of input or a blank answer.
pub fn prompt_for_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<PathBuf>> {
    write!(output, "{PROMPT}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let name = line.trim();
    Ok((!name.is_empty()).then(|| PathBuf::from(name)))
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::WARN);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let config = load_config_with(Format::Blast, CommonArgs::default(), env_of(&[]));
        assert_eq!(config.matrix_path, None);
        assert_eq!(config.load_mode, LoadMode::Mmap);
        assert!(!config.strict);
        assert_eq!(config.format.alphabet(), Alphabet::Blast);
    }

    #[test]
    fn env_fills_gaps_but_flags_win() {
        let env = env_of(&[
            ("MATCONV_MATRIX", "from_env.txt"),
            ("MATCONV_LOAD_MODE", "OWNED"),
            ("MATCONV_STRICT", "yes"),
        ]);
        let config = load_config_with(Format::Fasta, CommonArgs::default(), &env);
        assert_eq!(config.matrix_path, Some(PathBuf::from("from_env.txt")));
        assert_eq!(config.load_mode, LoadMode::Owned);
        assert!(config.strict);

        let args = CommonArgs {
            path: Some(PathBuf::from("cli.txt")),
            load_mode: Some(LoadMode::Mmap),
            ..CommonArgs::default()
        };
        let config = load_config_with(Format::Fasta, args, &env);
        assert_eq!(config.matrix_path, Some(PathBuf::from("cli.txt")));
        assert_eq!(config.load_mode, LoadMode::Mmap);
    }

    #[test]
    fn unknown_env_values_fall_back() {
        let env = env_of(&[("MATCONV_LOAD_MODE", "weird"), ("MATCONV_STRICT", "0")]);
        let config = load_config_with(Format::Blast, CommonArgs::default(), env);
        assert_eq!(config.load_mode, LoadMode::Mmap);
        assert!(!config.strict);
        assert!(parse_load_mode_arg("weird").is_err());
    }

    #[test]
    fn prompt_reads_one_line() {
        let mut input = Cursor::new("  blosum62.iij \nignored\n");
        let mut output = Vec::new();
        let path = prompt_for_path(&mut input, &mut output).unwrap();
        assert_eq!(path, Some(PathBuf::from("blosum62.iij")));
        assert_eq!(String::from_utf8(output).unwrap(), PROMPT);

        let mut empty = Cursor::new("");
        assert_eq!(prompt_for_path(&mut empty, &mut Vec::new()).unwrap(), None);
    }
}
