use log::warn;

use super::model::{AlignedTable, Row, Series};
use crate::error::{ExtractError, Result};

/// Zip row-aligned series into one table: row `i` holds the x of the first
/// series and the i-th y of every series.
///
/// All `columns` must have the same length. The optional `auxiliary` series
/// may be shorter; its samples are attached to the first rows and the
/// remaining rows carry none. Nothing is truncated or padded silently: any
/// other length disagreement is an [`ExtractError::Alignment`].
pub fn align(columns: &[Series], auxiliary: Option<&Series>) -> Result<AlignedTable> {
    let expected = columns.first().map_or(0, Series::len);

    for series in columns {
        if series.len() != expected {
            return Err(ExtractError::Alignment {
                series: series.label.clone(),
                expected,
                found: series.len(),
            });
        }
    }
    if let Some(aux) = auxiliary {
        if aux.len() > expected {
            return Err(ExtractError::Alignment {
                series: aux.label.clone(),
                expected,
                found: aux.len(),
            });
        }
    }

    let rows = (0..expected)
        .map(|i| {
            let x = &columns[0].samples[i].x;
            for series in &columns[1..] {
                let other = &series.samples[i].x;
                if other != x {
                    warn!(
                        "row {i}: '{}' has x = {other}, '{}' has x = {x}",
                        series.label, columns[0].label
                    );
                }
            }
            Row {
                x: x.clone(),
                values: columns.iter().map(|s| s.samples[i].y).collect(),
                auxiliary: auxiliary.and_then(|aux| aux.samples.get(i).cloned()),
            }
        })
        .collect();

    Ok(AlignedTable {
        columns: columns.iter().map(|s| s.label.clone()).collect(),
        auxiliary: auxiliary.map(|aux| aux.label.clone()),
        rows,
    })
}
