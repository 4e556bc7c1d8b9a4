use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use crate::data::align::align;
use crate::data::loader::{build_series_many, load_table_column, SeriesRequest};
use crate::data::model::{AlignedTable, Series};
use crate::export::{self, OutputKind, SeriesDocument};
use crate::profile::{Profile, Source};

// ---------------------------------------------------------------------------
// One invocation: profile + inputs → artifact
// ---------------------------------------------------------------------------

/// Build every series of `profile` and write the artifact `output` asks for.
///
/// Alignment happens before the output file is created, so a length
/// mismatch leaves no partial file behind.
pub fn run(profile: &Profile, inputs: &[PathBuf], output: &Path) -> Result<()> {
    let kind = export::output_kind(output)?;
    let series = extract(profile, inputs)?;

    match kind {
        OutputKind::Table => {
            let table = tabulate(profile, &series)?;
            if table.is_empty() {
                warn!("aligned table for '{}' has no rows", profile.name);
            }
            export::write_table_file(&table, output)?;
            info!(
                "Wrote {} rows x {} series to {}",
                table.len(),
                table.columns.len(),
                output.display()
            );
        }
        OutputKind::Series => {
            let document = SeriesDocument::new(profile, &series);
            export::write_series_file(&document, output)?;
            info!("Wrote {} series to {}", series.len(), output.display());
        }
    }
    Ok(())
}

/// Build all series of `profile`, in profile order.
///
/// Log-backed series that share an input file are built in a single scan of
/// that file.
pub fn extract(profile: &Profile, inputs: &[PathBuf]) -> Result<Vec<Series>> {
    let needed = profile.inputs_needed();
    if inputs.len() < needed {
        bail!(
            "profile '{}' reads {needed} input file(s), {} given",
            profile.name,
            inputs.len()
        );
    }
    if inputs.len() > needed {
        warn!("{} input file(s) not used by profile '{}'", inputs.len() - needed, profile.name);
    }

    let schema = profile.line_schema()?;
    let mut built: Vec<Option<Series>> = vec![None; profile.series.len()];

    for (input_idx, path) in inputs.iter().enumerate() {
        let mut positions = Vec::new();
        let mut requests = Vec::new();
        for (pos, spec) in profile.series.iter().enumerate() {
            if spec.input != input_idx {
                continue;
            }
            match spec.source()? {
                Source::Log(category) => {
                    debug!("{}: {category}", path.display());
                    positions.push(pos);
                    requests.push(SeriesRequest::new(category, spec.transform));
                }
                Source::Column(column) => {
                    let series = load_table_column(path, column, &spec.label, spec.transform)
                        .with_context(|| format!("reading '{}' from {}", spec.label, path.display()))?;
                    built[pos] = Some(series);
                }
            }
        }

        if requests.is_empty() {
            continue;
        }
        let series = build_series_many(path, &requests, &schema)
            .with_context(|| format!("extracting {} with schema {schema}", path.display()))?;
        for (pos, s) in positions.into_iter().zip(series) {
            built[pos] = Some(s);
        }
    }

    let series: Vec<Series> = built
        .into_iter()
        .zip(&profile.series)
        .map(|(s, spec)| s.unwrap_or_else(|| Series::new(spec.label.clone())))
        .collect();

    for s in &series {
        if s.is_empty() {
            warn!("series '{}' matched no lines", s.label);
        }
    }
    Ok(series)
}

/// Align the profile's table columns (and auxiliary series, if any).
pub fn tabulate(profile: &Profile, series: &[Series]) -> Result<AlignedTable> {
    let (columns, auxiliary) = profile.table_layout();
    let find = |label: &str| {
        series
            .iter()
            .find(|s| s.label == label)
            .with_context(|| format!("no series labelled '{label}'"))
    };

    let columns: Vec<Series> = columns
        .iter()
        .map(|label| find(label.as_str()).cloned())
        .collect::<Result<_>>()?;
    let auxiliary = auxiliary.as_deref().map(find).transpose()?;

    Ok(align(&columns, auxiliary).context("aligning series")?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::ExtractError;

    const RANGE_LOG: &str = "\
Alg = 0 \t Range = 50 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 8.0 GB/s
Alg = 1 \t NbFPE = 2 \t Range = 50 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 16.0 GB/s
Alg = 3 \t NbFPE = 8 \t Range = 50 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 4.0 GB/s
Alg = 0 \t Range = 100 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 24.0 GB/s
Alg = 1 \t NbFPE = 2 \t Range = 100 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 32.0 GB/s
";

    const PROFILE: &str = r#"
        name = "range"
        schema = "reduction-range"
        table = { auxiliary = "EE" }

        [[series]]
        label = "DDOT"
        primary = "Alg = 0"
        transform = { kind = "divide", by = 8.0 }

        [[series]]
        label = "FPE2"
        primary = "Alg = 1"
        secondary = "NbFPE = 2"
        transform = { kind = "divide", by = 8.0 }

        [[series]]
        label = "EE"
        primary = "Alg = 3"
        secondary = "NbFPE = 8"
        transform = { kind = "divide", by = 8.0 }
    "#;

    fn setup(log: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("bench.log");
        fs::write(&path, log).expect("write log");
        (dir, path)
    }

    #[test]
    fn table_output_end_to_end() {
        let (dir, log) = setup(RANGE_LOG);
        let out = dir.path().join("bench.gnuplot.dat");
        let profile = Profile::parse(PROFILE).unwrap();

        run(&profile, &[log], &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# x\tDDOT\tFPE2\tEE x\tEE y");
        assert_eq!(lines[1], "50\t1.0\t2.0\t50\t0.5");
        assert_eq!(lines[2], "100\t3.0\t4.0\t.");
    }

    #[test]
    fn series_output_end_to_end() {
        let (dir, log) = setup(RANGE_LOG);
        let out = dir.path().join("bench.json");
        let profile = Profile::parse(PROFILE).unwrap();

        run(&profile, &[log], &out).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["series"].as_array().unwrap().len(), 3);
        assert_eq!(value["series"][2]["label"], "EE");
        assert_eq!(value["series"][2]["samples"][0][1], 0.5);
    }

    #[test]
    fn unequal_lengths_leave_no_output() {
        let log_text = format!(
            "{RANGE_LOG}Alg = 0 \t Range = 150 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 8.0 GB/s\n"
        );
        let (dir, log) = setup(&log_text);
        let out = dir.path().join("bench.dat");
        let profile = Profile::parse(PROFILE).unwrap();

        let err = run(&profile, &[log], &out).unwrap_err();
        let root = err.root_cause().downcast_ref::<ExtractError>();
        assert!(matches!(root, Some(ExtractError::Alignment { expected: 3, found: 2, .. })), "{err:#}");
        assert!(!out.exists());
    }

    #[test]
    fn empty_category_completes() {
        let (dir, log) = setup(RANGE_LOG);
        let out = dir.path().join("bench.json");
        let profile = Profile::parse(
            r#"
            name = "missing"
            schema = "reduction-range"
            [[series]]
            label = "DDOT"
            primary = "Alg = 0"
            [[series]]
            label = "Never"
            primary = "Alg = 9"
            "#,
        )
        .unwrap();

        let series = extract(&profile, &[log.clone()]).unwrap();
        assert_eq!(series[0].len(), 2);
        assert!(series[1].is_empty());
        run(&profile, &[log], &out).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn format_error_names_category_and_line() {
        let (dir, log) = setup("Alg = 0 \t Range = 50 \t Throughput = n/a GB/s\n");
        let out = dir.path().join("bench.json");
        let profile = Profile::parse(PROFILE).unwrap();

        let err = run(&profile, &[log], &out).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("category 'DDOT', line 1"), "{message}");
        assert!(!out.exists());
    }

    #[test]
    fn log_and_table_inputs_combine() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("red.log");
        let table = dir.path().join("times.dat");
        fs::write(
            &log,
            "Alg = 2 \t Range = 3 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 80.0 GB/s\n",
        )
        .unwrap();
        fs::write(&table, "1000\t0\t0.5\n2000\t0\t1.0\n").unwrap();

        let profile = Profile::parse(
            r#"
            name = "sum"
            schema = "reduction-size"
            [[series]]
            label = "Red"
            primary = "Alg = 2"
            transform = { kind = "divide", by = 8.0 }
            [[series]]
            label = "Superacc"
            input = 1
            column = 2
            transform = { kind = "rate", scale = 1.0 }
            "#,
        )
        .unwrap();

        let series = extract(&profile, &[log, table]).unwrap();
        assert_eq!(series[0].samples[0].y, 10.0);
        assert_eq!(series[1].samples[0].y, 2000.0);
        assert_eq!(series[1].samples[1].y, 2000.0);
    }

    #[test]
    fn log_and_table_inputs_align_with_auxiliary() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("red.log");
        let timings = dir.path().join("times.txt");
        let out = dir.path().join("sum.gnuplot.dat");
        fs::write(
            &log,
            "Alg = 2 \t Range = 3 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 80.0 GB/s\n\
             Alg = 3 \t NbFPE = 8 \t Range = 3 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 4.0 GB/s\n\
             Alg = 2 \t Range = 3 \t NbElements = 2000 \t Size = 16000 \t Time = 0.1 s \t Throughput = 160.0 GB/s\n",
        )
        .unwrap();
        fs::write(&timings, "1000 0 0.5 \n2000 0 1.0 \n").unwrap();

        let profile = Profile::parse(
            r#"
            name = "sum"
            schema = "reduction-size"
            table = { auxiliary = "EE" }
            [[series]]
            label = "Red"
            primary = "Alg = 2"
            transform = { kind = "divide", by = 8.0 }
            [[series]]
            label = "Superacc"
            input = 1
            column = 2
            transform = { kind = "rate", scale = 1.0 }
            [[series]]
            label = "EE"
            primary = "Alg = 3"
            secondary = "NbFPE = 8"
            transform = { kind = "divide", by = 8.0 }
            "#,
        )
        .unwrap();

        run(&profile, &[log, timings], &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# x\tRed\tSuperacc\tEE x\tEE y");
        assert_eq!(lines[1], "1000\t10.0\t2000.0\t1000\t0.5");
        assert_eq!(lines[2], "2000\t20.0\t2000.0\t.");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn zero_time_in_timing_table_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("red.log");
        let timings = dir.path().join("times.txt");
        let out = dir.path().join("sum.json");
        fs::write(
            &log,
            "Alg = 2 \t Range = 3 \t NbElements = 1000 \t Size = 8000 \t Time = 0.1 s \t Throughput = 80.0 GB/s\n",
        )
        .unwrap();
        fs::write(&timings, "1000\t3\t0\n").unwrap();
        let profile = Profile::load("sum-size").unwrap();

        let err = run(&profile, &[log, timings], &out).unwrap_err();
        let root = err.root_cause().downcast_ref::<ExtractError>();
        assert!(matches!(root, Some(ExtractError::Format { .. })), "{err:#}");
        assert!(!out.exists());
    }

    #[test]
    fn extra_inputs_only_warn() {
        let (_dir, log) = setup(RANGE_LOG);
        let profile = Profile::parse(PROFILE).unwrap();

        let series = extract(&profile, &[log, PathBuf::from("unused.log")]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].len(), 2);
    }

    #[test]
    fn too_few_inputs_is_an_error() {
        let profile = Profile::load("sum-size").unwrap();
        assert!(extract(&profile, &[PathBuf::from("only-one.log")]).is_err());
    }
}
