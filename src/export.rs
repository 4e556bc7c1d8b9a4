use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::data::loader::FILLER;
use crate::data::model::{AlignedTable, Series};
use crate::profile::Profile;

/// What kind of artifact an output path asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Tab-separated aligned table.
    Table,
    /// JSON document handed to the renderer.
    Series,
}

/// Dispatch by extension.
///
/// * `.dat` / `.tsv` / `.txt` – aligned table
/// * `.json`                  – series document
pub fn output_kind(path: &Path) -> Result<OutputKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "dat" | "tsv" | "txt" => Ok(OutputKind::Table),
        "json" => Ok(OutputKind::Series),
        other => bail!("Unsupported output extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Tabular output
// ---------------------------------------------------------------------------

/// Write `table` as tab-separated text.
///
/// The first line is a `#` header naming the columns. Values keep a decimal
/// point (`1.0`, not `1`). When the table has an
/// auxiliary series every row ends either with that series' `x`, `y` or with
/// the filler `.`.
pub fn write_table<W: Write>(table: &AlignedTable, writer: W) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(writer);

    let mut header = vec!["# x".to_string()];
    header.extend(table.columns.iter().cloned());
    if let Some(aux) = &table.auxiliary {
        header.push(format!("{aux} x"));
        header.push(format!("{aux} y"));
    }
    out.write_record(&header).context("writing table header")?;

    for (i, row) in table.rows.iter().enumerate() {
        let mut record = Vec::with_capacity(row.values.len() + 3);
        record.push(row.x.clone());
        record.extend(row.values.iter().map(|v| format!("{v:?}")));
        if table.auxiliary.is_some() {
            match &row.auxiliary {
                Some(sample) => {
                    record.push(sample.x.clone());
                    record.push(format!("{:?}", sample.y));
                }
                None => record.push(FILLER.to_string()),
            }
        }
        out.write_record(&record)
            .with_context(|| format!("writing table row {i}"))?;
    }
    out.flush().context("flushing table")?;
    Ok(())
}

pub fn write_table_file(table: &AlignedTable, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_table(table, BufWriter::new(file))
}

// ---------------------------------------------------------------------------
// Series document (renderer hand-off)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SeriesDocument<'a> {
    pub profile: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub plot: &'a toml::Table,
    pub series: Vec<SeriesEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SeriesEntry<'a> {
    pub label: &'a str,
    pub color: String,
    pub style: &'a toml::Table,
    /// `[x, y]` pairs in log order.
    pub samples: Vec<(&'a str, f64)>,
}

impl<'a> SeriesDocument<'a> {
    /// Pair each built series with its profile entry. Both slices are in
    /// profile order.
    pub fn new(profile: &'a Profile, series: &'a [Series]) -> Self {
        let explicit: Vec<Option<String>> = profile.series.iter().map(|s| s.color.clone()).collect();
        let colors = crate::color::assign_colors(&explicit);

        let entries = profile
            .series
            .iter()
            .zip(series)
            .zip(colors)
            .map(|((spec, built), color)| SeriesEntry {
                label: &built.label,
                color,
                style: &spec.style,
                samples: built.samples.iter().map(|s| (s.x.as_str(), s.y)).collect(),
            })
            .collect();

        SeriesDocument {
            profile: &profile.name,
            description: profile.description.as_deref(),
            plot: &profile.plot,
            series: entries,
        }
    }
}

pub fn write_series_file(document: &SeriesDocument<'_>, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document).context("serialising series")?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
