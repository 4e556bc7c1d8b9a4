use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use super::extract::{self, Origin, Transform};
use super::filter;
use super::model::{Category, Sample, Series};
use super::schema::{FieldRef, LineSchema};
use crate::error::{ExtractError, Result};

/// Filler written in table cells that have no value.
pub const FILLER: &str = ".";

/// One series to build from a log: which lines, and how to convert them.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub category: Category,
    pub transform: Transform,
}

impl SeriesRequest {
    pub fn new(category: Category, transform: Transform) -> Self {
        SeriesRequest {
            category,
            transform,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Scan `path` once and build the series for a single category.
#[cfg_attr(not(test), allow(dead_code))]
pub fn build_series(path: &Path, request: &SeriesRequest, schema: &LineSchema) -> Result<Series> {
    let mut all = build_series_many(path, std::slice::from_ref(request), schema)?;
    Ok(all.remove(0))
}

/// Scan `path` once for all requests.
///
/// A line may feed several series. Each series receives its samples in file
/// order, exactly as if it had been built by its own scan.
pub fn build_series_many(
    path: &Path,
    requests: &[SeriesRequest],
    schema: &LineSchema,
) -> Result<Vec<Series>> {
    let file = File::open(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = scan(BufReader::new(file), path, requests, schema)?;

    info!(
        "{}: {}",
        path.display(),
        series
            .iter()
            .map(|s| format!("{}={}", s.label, s.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(series)
}

// ---------------------------------------------------------------------------
// Log scan
// ---------------------------------------------------------------------------

fn scan<R: BufRead>(
    reader: R,
    path: &Path,
    requests: &[SeriesRequest],
    schema: &LineSchema,
) -> Result<Vec<Series>> {
    let mut series: Vec<Series> = requests
        .iter()
        .map(|r| Series::new(r.category.label.clone()))
        .collect();

    let mut inspected = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        inspected += 1;
        let line_no = idx + 1;

        let mut tokens: Option<Vec<&str>> = None;
        for (request, out) in requests.iter().zip(series.iter_mut()) {
            if !filter::matches(&line, &request.category, schema) {
                continue;
            }
            let tokens: &[&str] = tokens.get_or_insert_with(|| line.split_whitespace().collect());
            let layout = schema.layout(filter::variant_of(&line, schema));
            let origin = Origin {
                category: &request.category.label,
                line: line_no,
            };
            let sample = extract::extract_sample(tokens, layout, request.transform, origin)?;
            debug!("{} line {line_no}: ({}, {})", out.label, sample.x, sample.y);
            out.push(sample);
        }
    }

    debug!("{}: inspected {inspected} lines", path.display());
    Ok(series)
}

// ---------------------------------------------------------------------------
// Table column loader
// ---------------------------------------------------------------------------

/// Read column `column` of a whitespace-separated table as a series; column 0
/// is x. Accepts both the tab-separated tables written by
/// [`crate::export::write_table`] and the space-separated timing tables the
/// benchmark drivers print.
///
/// `#` lines and blank lines are skipped, as are rows whose cell holds the
/// filler marker. A row that ends in the filler before reaching `column` is
/// a row without auxiliary data and is skipped too.
pub fn load_table_column(
    path: &Path,
    column: usize,
    label: &str,
    transform: Transform,
) -> Result<Series> {
    let io_err = |source: std::io::Error| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut series = Series::new(label);
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let origin = Origin {
            category: label,
            line: idx + 1,
        };
        let fields: Vec<&str> = trimmed.split_whitespace().collect();

        let x = extract::token(&fields, FieldRef::Index(0), origin)?;
        if column >= fields.len() && fields.last() == Some(&FILLER) {
            continue;
        }
        let cell = extract::token(&fields, FieldRef::Index(column), origin)?;
        if cell == FILLER {
            continue;
        }
        let raw = extract::number(cell, FieldRef::Index(column), origin)?;
        let x_value = if transform.needs_numeric_x() {
            Some(extract::number(x, FieldRef::Index(0), origin)?)
        } else {
            None
        };
        let y = extract::transformed(transform, x_value, raw, FieldRef::Index(column), origin)?;
        series.push(Sample::new(x, y));
    }

    info!("{}: column {column} -> {} samples", path.display(), series.len());
    Ok(series)
}
