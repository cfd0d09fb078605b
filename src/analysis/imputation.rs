//! Imputation Stage: turns an indicator series into a gap-free one, or reports that there
//! is not enough of it yet.

use crate::models::{IndicatorColumn, IndicatorRow, PriceColumn};
use crate::utils::maths_utils::median_of_defined;
use crate::utils::vec_utils;

/// Column sets and thresholds for one cleaning pass.
#[derive(Debug, Clone)]
pub struct CleanSpec {
    pub indicator_cols: Vec<IndicatorColumn>,
    pub price_cols: Vec<PriceColumn>,
    pub skip_rows: usize,
    pub min_rows: usize,
}

impl CleanSpec {
    /// Every indicator and price column.
    pub fn all_columns(skip_rows: usize, min_rows: usize) -> Self {
        Self {
            indicator_cols: IndicatorColumn::all(),
            price_cols: PriceColumn::all(),
            skip_rows,
            min_rows,
        }
    }
}

/// Returns `None` when fewer than `spec.min_rows` rows survive. That is the normal
/// early-lifecycle state, not an error.
pub fn clean(rows: &[IndicatorRow], spec: &CleanSpec) -> Option<Vec<IndicatorRow>> {
    // 1. Cold look-back windows
    let mut kept: Vec<IndicatorRow> = rows.iter().skip(spec.skip_rows).cloned().collect();

    for &column in &spec.indicator_cols {
        let mut cells: Vec<Option<f64>> = kept.iter().map(|row| row.get(column)).collect();

        // 2. Carry the last known value over isolated holes
        vec_utils::fill_forward_mut(&mut cells);

        // 3. Whatever is still missing (leading cells) takes the column median
        if let Some(median) = median_of_defined(&cells) {
            vec_utils::fill_with_mut(&mut cells, median);
        }

        // 4. Final pass; only changes anything when the column had no defined cell at all
        vec_utils::fill_forward_mut(&mut cells);
        vec_utils::fill_backward_mut(&mut cells);
        if !kept.is_empty() && vec_utils::has_any_none_elements(&cells) {
            log::warn!(
                "Column {} has no defined values after skipping {} rows",
                column,
                spec.skip_rows
            );
        }

        for (row, cell) in kept.iter_mut().zip(cells) {
            row.set(column, cell);
        }
    }

    // 5. Price holes are never imputed
    kept.retain(|row| {
        spec.price_cols
            .iter()
            .all(|&column| row.price(column).is_finite())
    });

    // 6. Not enough yet
    if kept.len() < spec.min_rows {
        return None;
    }
    Some(kept)
}
