use serde::Serialize;

use scoremat_complete::CellSource;
use scoremat_reader::LoadReport;

use crate::convert::Conversion;

/// Machine-readable summary printed by `--report-json`.
#[derive(Debug, Serialize)]
pub struct DiagnosticsReport {
    pub source: String,
    pub alphabet: String,
    pub policy: String,
    pub comments: usize,
    pub header_width: usize,
    pub undeclared: Vec<char>,
    pub load: LoadSummary,
    pub extrema: Option<ExtremaSummary>,
    pub provenance: ProvenanceSummary,
    pub unresolved: Vec<String>,
    /// Unresolved cells the layout prints with a default score.
    pub defaulted: usize,
}

#[derive(Debug, Serialize)]
pub struct LoadSummary {
    pub rows_seen: usize,
    pub rows_ignored: usize,
    pub values_stored: usize,
    pub values_discarded: usize,
    pub tokens_skipped: usize,
    pub cells_overwritten: usize,
}

#[derive(Debug, Serialize)]
pub struct ExtremaSummary {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Serialize)]
pub struct ProvenanceSummary {
    pub loaded: usize,
    pub mirrored: usize,
    pub ambiguity_copy: usize,
    pub wildcard_minimum: usize,
    pub stop_diagonal: usize,
    pub unresolved: usize,
}

impl From<&LoadReport> for LoadSummary {
    fn from(report: &LoadReport) -> Self {
        Self {
            rows_seen: report.rows_seen,
            rows_ignored: report.rows_ignored,
            values_stored: report.values_stored,
            values_discarded: report.values_discarded,
            tokens_skipped: report.tokens_skipped,
            cells_overwritten: report.cells_overwritten,
        }
    }
}

impl DiagnosticsReport {
    pub fn from_conversion(conversion: &Conversion) -> Self {
        let completion = &conversion.completion;
        let count = |pred: fn(&CellSource) -> bool| completion.count_sources(pred);
        Self {
            source: conversion.source.clone(),
            alphabet: conversion.mapping.alphabet().to_string(),
            policy: format!("{:?}", conversion.policy).to_lowercase(),
            comments: conversion.comments.len(),
            header_width: conversion.mapping.len(),
            undeclared: conversion
                .mapping
                .undeclared()
                .into_iter()
                .map(|s| s.to_char())
                .collect(),
            load: LoadSummary::from(&conversion.report),
            extrema: completion.extrema.map(|e| ExtremaSummary {
                min: e.min,
                max: e.max,
            }),
            provenance: ProvenanceSummary {
                loaded: count(|s| matches!(s, CellSource::Loaded)),
                mirrored: count(|s| matches!(s, CellSource::Mirrored)),
                ambiguity_copy: count(|s| matches!(s, CellSource::AmbiguityCopy { .. })),
                wildcard_minimum: count(|s| matches!(s, CellSource::WildcardMinimum)),
                stop_diagonal: count(|s| matches!(s, CellSource::StopDiagonal)),
                unresolved: count(|s| matches!(s, CellSource::Unresolved)),
            },
            unresolved: completion.unresolved.iter().map(|c| c.to_string()).collect(),
            defaulted: conversion.unresolved_by_rendering().1.len(),
        }
    }
}
