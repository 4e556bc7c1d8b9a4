use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Category – which log lines belong to one series
// ---------------------------------------------------------------------------

/// One algorithm/parameter combination to extract, e.g.
/// `primary = "Alg = 2"`, `secondary = "NbFPE = 4"`.
///
/// Tags are plain substrings; their meaning depends entirely on the
/// benchmark that wrote the log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Human-readable name used in errors, warnings and output headers.
    pub label: String,
    pub primary: String,
    /// Optional second selector. Absent means "primary alone decides".
    #[serde(default)]
    pub secondary: Option<String>,
}

impl Category {
    pub fn new(label: impl Into<String>, primary: impl Into<String>) -> Self {
        Category {
            label: label.into(),
            primary: primary.into(),
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    /// All tags a line must contain to belong to this category.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.secondary.as_deref())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary {
            Some(sec) => write!(f, "{} [{} / {}]", self.label, self.primary, sec),
            None => write!(f, "{} [{}]", self.label, self.primary),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample / Series – extracted observations
// ---------------------------------------------------------------------------

/// One observation. `x` keeps the exact text of the log token so it can be
/// written back out untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub x: String,
    pub y: f64,
}

impl Sample {
    pub fn new(x: impl Into<String>, y: f64) -> Self {
        Sample { x: x.into(), y }
    }
}

/// Samples of one category in log-file order. Never sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(label: impl Into<String>) -> Self {
        Series {
            label: label.into(),
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no line matched.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AlignedTable – several series zipped by index
// ---------------------------------------------------------------------------

/// One row of an [`AlignedTable`]: the shared x-value, one y per column
/// series and, when the table has an auxiliary series, that series' sample
/// for this index (if it still has one).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub x: String,
    pub values: Vec<f64>,
    pub auxiliary: Option<Sample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    /// Labels of the column series, in column order.
    pub columns: Vec<String>,
    /// Label of the auxiliary series, if one was attached.
    pub auxiliary: Option<String>,
    pub rows: Vec<Row>,
}

impl AlignedTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
