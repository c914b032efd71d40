//! Convert self-describing scoring matrix files into the BLAST full-matrix
//! layout (`matblas`) and the legacy FASTA pairwise layout (`matfas`).

pub mod config;
pub mod convert;
pub mod export;
pub mod histogram;
pub mod report;

pub use config::{CommonArgs, Config, Format, init_tracing, load_config, load_config_with};
pub use convert::{ConvertError, Conversion, convert, run};
pub use histogram::Histogram;
pub use report::DiagnosticsReport;
