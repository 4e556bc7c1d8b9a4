use std::fmt;

use serde::Deserialize;

use crate::error::{ExtractError, Result};

// ---------------------------------------------------------------------------
// FieldRef – where a named field lives in a tokenised line
// ---------------------------------------------------------------------------

/// Position of a field within the whitespace-split tokens of a line.
///
/// In TOML: `{ index = 11 }` or `{ from-end = 2 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldRef {
    /// 0-based token index from the start of the line.
    Index(usize),
    /// 1-based token index from the end (`FromEnd(1)` is the last token).
    FromEnd(usize),
}

impl FieldRef {
    /// Resolve to a 0-based index for a line of `len` tokens.
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            FieldRef::Index(i) if i < len => Some(i),
            FieldRef::FromEnd(n) if n >= 1 && n <= len => Some(len - n),
            _ => None,
        }
    }

    pub fn read<'a>(self, tokens: &[&'a str]) -> Option<&'a str> {
        self.resolve(tokens.len()).map(|i| tokens[i])
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Index(i) => write!(f, "#{i}"),
            FieldRef::FromEnd(n) => write!(f, "#-{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Layout / LineSchema
// ---------------------------------------------------------------------------

/// Named fields of one line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Layout {
    /// Independent variable (array size, matrix size, dynamic range).
    pub x: FieldRef,
    /// Dependent metric (throughput, time, performance).
    pub y: FieldRef,
}

/// Which of the two layouts a line uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVariant {
    /// The writer added a parameter annotation (`NbFPE = n`), shifting the
    /// following columns.
    Annotated,
    Plain,
}

/// A versioned description of one benchmark's log line format.
///
/// ```toml
/// name = "reduction-size"
/// version = 1
/// marker = "Throughput = "
/// annotated = { x = { index = 11 }, y = { from-end = 2 } }
/// plain = { x = { index = 8 }, y = { from-end = 2 } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LineSchema {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    /// Substring every data line carries (the metric label). Lines without
    /// it are ignored even if their tags match.
    #[serde(default)]
    pub marker: Option<String>,
    /// Presence of this substring selects the annotated layout.
    #[serde(default = "default_discriminator")]
    pub discriminator: String,
    pub annotated: Layout,
    pub plain: Layout,
}

fn default_version() -> u32 {
    1
}

fn default_discriminator() -> String {
    "NbFPE".to_string()
}

impl LineSchema {
    pub fn layout(&self, variant: LineVariant) -> &Layout {
        match variant {
            LineVariant::Annotated => &self.annotated,
            LineVariant::Plain => &self.plain,
        }
    }
}

impl fmt::Display for LineSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

// ---------------------------------------------------------------------------
// Built-in registry
// ---------------------------------------------------------------------------

const SECOND_TO_LAST: FieldRef = FieldRef::FromEnd(2);

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: &[&str] = &[
    "reduction-size",
    "reduction-range",
    "gemm-performance",
    "trsv-time",
];

/// Look up a built-in schema by `name` or `name@version`.
///
/// Reduction benchmarks (sum, dot) write
/// `Alg = a [NbFPE = f] Range = r NbElements = n Size = b Time = t s Throughput = v GB/s`;
/// the optional `NbFPE = f` shifts every later column by three tokens.
pub fn builtin(name: &str) -> Result<LineSchema> {
    let (base, version) = match name.split_once('@') {
        Some((base, v)) => (base, v.parse::<u32>().ok()),
        None => (name, Some(1)),
    };
    if version != Some(1) {
        return Err(ExtractError::UnknownSchema(name.to_string()));
    }

    let schema = match base {
        "reduction-size" => LineSchema {
            name: base.to_string(),
            version: 1,
            marker: Some("Throughput = ".to_string()),
            discriminator: default_discriminator(),
            annotated: Layout {
                x: FieldRef::Index(11),
                y: SECOND_TO_LAST,
            },
            plain: Layout {
                x: FieldRef::Index(8),
                y: SECOND_TO_LAST,
            },
        },
        "reduction-range" => LineSchema {
            name: base.to_string(),
            version: 1,
            marker: Some("Throughput = ".to_string()),
            discriminator: default_discriminator(),
            annotated: Layout {
                x: FieldRef::Index(8),
                y: SECOND_TO_LAST,
            },
            plain: Layout {
                x: FieldRef::Index(5),
                y: SECOND_TO_LAST,
            },
        },
        // Alg = a [NbFPE = f] Range = r Size = n Time = t s Performance = p GFLOPS
        "gemm-performance" => LineSchema {
            name: base.to_string(),
            version: 1,
            marker: Some("Performance = ".to_string()),
            discriminator: default_discriminator(),
            annotated: Layout {
                x: FieldRef::Index(11),
                y: SECOND_TO_LAST,
            },
            plain: Layout {
                x: FieldRef::Index(8),
                y: SECOND_TO_LAST,
            },
        },
        // Alg = a NbFPE = f Range = r NbRows = n Time = t s Performance = p GFLOPS
        // The writer always emits NbFPE, so both layouts agree.
        "trsv-time" => {
            let layout = Layout {
                x: FieldRef::Index(11),
                y: FieldRef::Index(14),
            };
            LineSchema {
                name: base.to_string(),
                version: 1,
                marker: Some("Time = ".to_string()),
                discriminator: default_discriminator(),
                annotated: layout,
                plain: layout,
            }
        }
        _ => return Err(ExtractError::UnknownSchema(name.to_string())),
    };
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ref_resolves_both_directions() {
        let tokens = ["a", "b", "c", "d"];
        assert_eq!(FieldRef::Index(0).read(&tokens), Some("a"));
        assert_eq!(FieldRef::Index(3).read(&tokens), Some("d"));
        assert_eq!(FieldRef::Index(4).read(&tokens), None);
        assert_eq!(FieldRef::FromEnd(1).read(&tokens), Some("d"));
        assert_eq!(FieldRef::FromEnd(2).read(&tokens), Some("c"));
        assert_eq!(FieldRef::FromEnd(5).read(&tokens), None);
        assert_eq!(FieldRef::FromEnd(0).read(&tokens), None);
    }

    #[test]
    fn builtin_lookup_accepts_version_suffix() {
        let schema = builtin("reduction-range@1").unwrap();
        assert_eq!(schema.to_string(), "reduction-range@1");
        assert_eq!(schema.annotated.x, FieldRef::Index(8));
        assert_eq!(schema.plain.x, FieldRef::Index(5));

        assert!(matches!(
            builtin("reduction-range@2"),
            Err(ExtractError::UnknownSchema(_))
        ));
        assert!(matches!(builtin("nope"), Err(ExtractError::UnknownSchema(_))));
    }

    #[test]
    fn every_listed_builtin_resolves() {
        for name in BUILTIN_NAMES {
            assert_eq!(builtin(name).unwrap().name, *name);
        }
    }

    #[test]
    fn inline_schema_parses_from_toml() {
        let text = r#"
            name = "custom"
            marker = "Time = "
            annotated = { x = { index = 11 }, y = { index = 14 } }
            plain = { x = { index = 8 }, y = { from-end = 2 } }
        "#;
        let schema: LineSchema = toml::from_str(text).unwrap();
        assert_eq!(schema.version, 1);
        assert_eq!(schema.discriminator, "NbFPE");
        assert_eq!(schema.annotated.y, FieldRef::Index(14));
        assert_eq!(schema.plain.y, FieldRef::FromEnd(2));
    }
}
