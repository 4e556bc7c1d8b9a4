use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::data::extract::Transform;
use crate::data::model::Category;
use crate::data::schema::{self, LineSchema};

// ---------------------------------------------------------------------------
// Profile – one plot or table, described in TOML
// ---------------------------------------------------------------------------

/// Everything needed to turn benchmark logs into series for one artifact.
///
/// ```toml
/// name = "ddot-size"
/// schema = "reduction-size"
///
/// [plot]
/// xlabel = "Array size"
///
/// [[series]]
/// label = "Expansion 4"
/// primary = "Alg = 2"
/// secondary = "NbFPE = 4"
/// transform = { kind = "divide", by = 8.0 }
/// style = { lt = 2, lw = 4.0 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub schema: SchemaRef,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub table: Option<TableSpec>,
    /// Cosmetic settings for the renderer. Not interpreted here.
    #[serde(default)]
    pub plot: toml::Table,
}

/// A registry name (`"reduction-size"`, `"trsv-time@1"`) or an inline schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Named(String),
    Inline(LineSchema),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeriesSpec {
    pub label: String,
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
    /// Index into the input files given on the command line.
    #[serde(default)]
    pub input: usize,
    /// Read this column of a previously written table instead of scanning a log.
    #[serde(default)]
    pub column: Option<usize>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub style: toml::Table,
}

/// Where a series' samples come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Log(Category),
    Column(usize),
}

impl SeriesSpec {
    pub fn source(&self) -> Result<Source> {
        match (&self.primary, self.column) {
            (Some(primary), None) => {
                let category = Category::new(self.label.as_str(), primary.as_str());
                Ok(Source::Log(match &self.secondary {
                    Some(secondary) => category.with_secondary(secondary.as_str()),
                    None => category,
                }))
            }
            (None, Some(column)) => Ok(Source::Column(column)),
            (Some(_), Some(_)) => bail!("series '{}': set either 'primary' or 'column', not both", self.label),
            (None, None) => bail!("series '{}': needs a 'primary' tag or a 'column'", self.label),
        }
    }
}

/// Column layout for tabular output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableSpec {
    /// Series labels in column order. Defaults to every non-auxiliary series.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// Label of the series appended as trailing (x, y) columns.
    #[serde(default)]
    pub auxiliary: Option<String>,
}

// ---------------------------------------------------------------------------
// Built-in presets
// ---------------------------------------------------------------------------

/// Presets shipped with the binary: (name, TOML source).
pub const PRESETS: &[(&str, &str)] = &[
    ("ddot-size", include_str!("../profiles/ddot-size.toml")),
    ("ddot-range", include_str!("../profiles/ddot-range.toml")),
    ("ddot-range-table", include_str!("../profiles/ddot-range-table.toml")),
    ("sum-size", include_str!("../profiles/sum-size.toml")),
    ("dgemm-size", include_str!("../profiles/dgemm-size.toml")),
    ("trsv-size", include_str!("../profiles/trsv-size.toml")),
];

impl Profile {
    /// Resolve the first CLI argument: a `.toml` path, or a preset name.
    pub fn load(arg: &str) -> Result<Self> {
        let path = Path::new(arg);
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("toml")) || path.is_file() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            return Self::parse(&text).with_context(|| format!("parsing profile {}", path.display()));
        }

        match PRESETS.iter().find(|(name, _)| *name == arg) {
            Some((name, text)) => Self::parse(text).with_context(|| format!("parsing preset '{name}'")),
            None => {
                let names: Vec<&str> = PRESETS.iter().map(|(n, _)| *n).collect();
                bail!("'{arg}' is neither a .toml profile nor a preset ({})", names.join(", "))
            }
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(text)?;
        profile.check()?;
        Ok(profile)
    }

    /// Resolve `schema` against the built-in registry.
    pub fn line_schema(&self) -> Result<LineSchema> {
        match &self.schema {
            SchemaRef::Named(name) => Ok(schema::builtin(name)?),
            SchemaRef::Inline(schema) => Ok(schema.clone()),
        }
    }

    /// Highest input index any series refers to, plus one.
    pub fn inputs_needed(&self) -> usize {
        self.series.iter().map(|s| s.input + 1).max().unwrap_or(0)
    }

    /// Labels of the table's column series and its auxiliary series.
    pub fn table_layout(&self) -> (Vec<String>, Option<String>) {
        let spec = self.table.clone().unwrap_or_default();
        let columns = spec.columns.unwrap_or_else(|| {
            self.series
                .iter()
                .map(|s| s.label.clone())
                .filter(|label| Some(label) != spec.auxiliary.as_ref())
                .collect()
        });
        (columns, spec.auxiliary)
    }

    /// Structural checks that do not depend on the input files.
    fn check(&self) -> Result<()> {
        if self.series.is_empty() {
            bail!("profile '{}' defines no series", self.name);
        }
        self.line_schema()?;

        let mut labels = BTreeSet::new();
        for spec in &self.series {
            if !labels.insert(spec.label.as_str()) {
                bail!("duplicate series label '{}'", spec.label);
            }
            spec.source()?;
            match spec.transform {
                Transform::Divide { by } if by == 0.0 || !by.is_finite() => {
                    bail!("series '{}': cannot divide by {by}", spec.label)
                }
                Transform::Multiply { by } if !by.is_finite() => {
                    bail!("series '{}': multiplier {by} is not finite", spec.label)
                }
                Transform::Rate { scale } if !scale.is_finite() => {
                    bail!("series '{}': rate scale {scale} is not finite", spec.label)
                }
                _ => {}
            }
        }

        let (columns, auxiliary) = self.table_layout();
        for label in columns.iter().chain(auxiliary.iter()) {
            if !labels.contains(label.as_str()) {
                bail!("table refers to unknown series '{label}'");
            }
        }
        if let Some(aux) = &auxiliary {
            if columns.contains(aux) {
                bail!("series '{aux}' cannot be both a column and the auxiliary");
            }
        }
        Ok(())
    }
}
