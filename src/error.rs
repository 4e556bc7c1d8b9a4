use std::path::PathBuf;

use thiserror::Error;

use crate::data::schema::FieldRef;

/// Errors raised by the extraction core (`data::*`).
///
/// The orchestration layer wraps these in `anyhow` with file/profile context.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A matched line does not have the token the layout points at, or the
    /// token is not a number.
    #[error("category '{category}', line {line}, token {position}: {reason}")]
    Format {
        category: String,
        /// 1-based line number in the scanned file.
        line: usize,
        /// Token the layout pointed at.
        position: FieldRef,
        reason: String,
    },

    /// Series handed to the aligner disagree on length.
    #[error("series '{series}' has {found} samples, expected {expected}")]
    Alignment {
        series: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown line schema '{0}' (built-in: {names})", names = crate::data::schema::BUILTIN_NAMES.join(", "))]
    UnknownSchema(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
