use serde::Deserialize;

use super::model::Sample;
use super::schema::{FieldRef, Layout};
use crate::error::{ExtractError, Result};

// ---------------------------------------------------------------------------
// Unit transforms
// ---------------------------------------------------------------------------

/// Conversion applied to the raw metric of every extracted sample.
///
/// In TOML: `transform = { kind = "divide", by = 8.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Transform {
    #[default]
    Identity,
    /// `y / by`, e.g. bits to bytes with `by = 8`.
    Divide { by: f64 },
    /// `y * by`.
    Multiply { by: f64 },
    /// `scale * x / y`: turns an elapsed time into a rate over the problem
    /// size (`scale = 1e-9` gives G-accumulations per second).
    Rate { scale: f64 },
}

impl Transform {
    /// Whether [`Transform::apply`] reads the numeric x value.
    pub fn needs_numeric_x(self) -> bool {
        matches!(self, Transform::Rate { .. })
    }

    /// Apply to a raw metric. `x` must be `Some` for transforms that read it.
    pub fn apply(self, x: Option<f64>, y: f64) -> f64 {
        match self {
            Transform::Identity => y,
            Transform::Divide { by } => y / by,
            Transform::Multiply { by } => y * by,
            Transform::Rate { scale } => scale * x.unwrap_or(f64::NAN) / y,
        }
    }
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Where the tokens came from, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub category: &'a str,
    /// 1-based line number.
    pub line: usize,
}

impl Origin<'_> {
    fn error(&self, position: FieldRef, reason: impl Into<String>) -> ExtractError {
        ExtractError::Format {
            category: self.category.to_string(),
            line: self.line,
            position,
            reason: reason.into(),
        }
    }
}

/// Read the token at `position`, failing when the line is too short.
pub fn token<'a>(tokens: &[&'a str], position: FieldRef, origin: Origin<'_>) -> Result<&'a str> {
    position
        .read(tokens)
        .ok_or_else(|| origin.error(position, format!("line has only {} tokens", tokens.len())))
}

/// Parse a numeric token the way the benchmark writer formats them.
pub fn number(text: &str, position: FieldRef, origin: Origin<'_>) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| origin.error(position, format!("'{text}' is not a number")))
}

/// Apply `transform` and reject results that are not finite numbers
/// (a zero time under `rate`, a metric printed as `inf`).
pub fn transformed(
    transform: Transform,
    x: Option<f64>,
    raw: f64,
    position: FieldRef,
    origin: Origin<'_>,
) -> Result<f64> {
    let y = transform.apply(x, raw);
    if y.is_finite() {
        Ok(y)
    } else {
        Err(origin.error(position, format!("'{raw}' converts to non-finite {y}")))
    }
}

/// Build a [`Sample`] from a tokenised line using the fields of `layout`.
pub fn extract_sample(
    tokens: &[&str],
    layout: &Layout,
    transform: Transform,
    origin: Origin<'_>,
) -> Result<Sample> {
    let x = token(tokens, layout.x, origin)?;
    let raw = number(token(tokens, layout.y, origin)?, layout.y, origin)?;

    let x_value = if transform.needs_numeric_x() {
        Some(number(x, layout.x, origin)?)
    } else {
        None
    };

    let y = transformed(transform, x_value, raw, layout.y, origin)?;
    Ok(Sample::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITS_TO_BYTES: Transform = Transform::Divide { by: 8.0 };

    fn origin() -> Origin<'static> {
        Origin {
            category: "FPE4",
            line: 7,
        }
    }

    fn tokens(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    const FPE_LAYOUT: Layout = Layout {
        x: FieldRef::Index(11),
        y: FieldRef::FromEnd(2),
    };
    const PLAIN_LAYOUT: Layout = Layout {
        x: FieldRef::Index(8),
        y: FieldRef::FromEnd(2),
    };

    #[test]
    fn annotated_line_divides_throughput_by_eight() {
        let line = "Alg = 2 \t NbFPE = 4 \t Range = 3 \t NbElements = 1000 \t Size = 8000 \t Time = 0.00001 s \t Throughput = 5000.0 GB/s";
        let sample =
            extract_sample(&tokens(line), &FPE_LAYOUT, BITS_TO_BYTES, origin()).unwrap();
        assert_eq!(sample, Sample::new("1000", 625.0));
    }

    #[test]
    fn plain_line_reads_earlier_x() {
        let line = "Alg = 0 \t Range = 3 \t NbElements = 4096 \t Size = 32768 \t Time = 0.00001 s \t Throughput = 12.25 GB/s";
        let sample =
            extract_sample(&tokens(line), &PLAIN_LAYOUT, Transform::Identity, origin()).unwrap();
        assert_eq!(sample, Sample::new("4096", 12.25));
    }

    #[test]
    fn y_is_second_to_last_token_in_both_layouts() {
        let annotated = "Alg = 3 NbFPE = 8 Range = 50 NbElements = 77 Size = 616 Time = 1 s Throughput = 3.5 GB/s";
        let plain = "Alg = 1 Range = 50 NbElements = 77 Size = 616 Time = 1 s Throughput = 9.75 GB/s";

        let a = extract_sample(&tokens(annotated), &FPE_LAYOUT, Transform::Identity, origin()).unwrap();
        let p = extract_sample(&tokens(plain), &PLAIN_LAYOUT, Transform::Identity, origin()).unwrap();
        assert_eq!(a.y, 3.5);
        assert_eq!(p.y, 9.75);
    }

    #[test]
    fn short_line_is_a_format_error() {
        let err = extract_sample(&tokens("Alg = 2 NbFPE = 4 x"), &FPE_LAYOUT, Transform::Identity, origin())
            .unwrap_err();
        match err {
            ExtractError::Format {
                category,
                line,
                position,
                ..
            } => {
                assert_eq!(category, "FPE4");
                assert_eq!(line, 7);
                assert_eq!(position, FieldRef::Index(11));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_metric_is_a_format_error() {
        let line = "Alg = 0 Range = 3 NbElements = 1000 Size = 8000 Time = 1 s Throughput = fast GB/s";
        let err = extract_sample(&tokens(line), &PLAIN_LAYOUT, Transform::Identity, origin()).unwrap_err();
        assert!(err.to_string().contains("'fast' is not a number"), "{err}");
    }

    #[test]
    fn rate_uses_x_over_time() {
        let y = Transform::Rate { scale: 1e-9 }.apply(Some(2e9), 0.5);
        assert_eq!(y, 4.0);
    }

    #[test]
    fn rate_requires_numeric_x() {
        let layout = Layout {
            x: FieldRef::Index(0),
            y: FieldRef::Index(1),
        };
        let err = extract_sample(&["n/a", "0.5"], &layout, Transform::Rate { scale: 1.0 }, origin())
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Format {
                position: FieldRef::Index(0),
                ..
            }
        ));
    }

    #[test]
    fn zero_time_under_rate_is_a_format_error() {
        let layout = Layout {
            x: FieldRef::Index(0),
            y: FieldRef::Index(1),
        };
        let err = extract_sample(&["1000", "0"], &layout, Transform::Rate { scale: 1e-9 }, origin())
            .unwrap_err();
        match err {
            ExtractError::Format { position, reason, .. } => {
                assert_eq!(position, FieldRef::Index(1));
                assert!(reason.contains("non-finite"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn infinite_metric_is_a_format_error() {
        let line = "Alg = 0 Range = 3 NbElements = 1000 Size = 8000 Time = 1 s Throughput = inf GB/s";
        assert!(extract_sample(&tokens(line), &PLAIN_LAYOUT, Transform::Identity, origin()).is_err());
    }

    #[test]
    fn transform_parses_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            transform: Transform,
        }
        let h: Holder = toml::from_str(r#"transform = { kind = "divide", by = 8.0 }"#).unwrap();
        assert_eq!(h.transform, BITS_TO_BYTES);
        let h: Holder = toml::from_str(r#"transform = { kind = "identity" }"#).unwrap();
        assert_eq!(h.transform, Transform::Identity);
    }
}
