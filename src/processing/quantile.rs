//! Quantiles with linear interpolation between closest ranks.

use crate::error::PipelineResult;
use crate::types::DataSet;

/// The `q` quantile of a numeric column, ignoring nulls.
///
/// With the non-null values sorted ascending as `v[0..n]`, the quantile sits at fractional
/// position `q * (n - 1)` and is interpolated linearly between the two neighbouring values.
/// Returns `Ok(None)` when the column has no numeric values.
///
/// # Panics
///
/// Panics if `q` is outside `0.0..=1.0`.
pub fn quantile(dataset: &DataSet, column: &str, q: f64) -> PipelineResult<Option<f64>> {
    assert!((0.0..=1.0).contains(&q), "quantile must be within [0, 1], got {q}");
    let mut values: Vec<f64> = dataset.column(column)?.filter_map(|v| v.as_f64()).collect();
    values.sort_by(f64::total_cmp);
    Ok(interpolate_sorted(&values, q))
}

fn interpolate_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::{interpolate_sorted, quantile};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    #[test]
    fn interpolates_between_neighbours() {
        // pos = 0.9 * 4 = 3.6 -> 40 + 0.6 * 10
        let q = interpolate_sorted(&[10.0, 20.0, 30.0, 40.0, 50.0], 0.9).unwrap();
        assert!((q - 46.0).abs() < 1e-9);
    }

    #[test]
    fn exact_rank_and_edges() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(interpolate_sorted(&v, 0.5), Some(2.0));
        assert_eq!(interpolate_sorted(&v, 0.0), Some(1.0));
        assert_eq!(interpolate_sorted(&v, 1.0), Some(3.0));
        assert_eq!(interpolate_sorted(&[7.0], 0.9), Some(7.0));
        assert_eq!(interpolate_sorted(&[], 0.9), None);
    }

    #[test]
    fn column_quantile_ignores_nulls_and_order() {
        let ds = DataSet::new(
            Schema::new(vec![Field::new("total_sales", DataType::Float64)]),
            vec![
                vec![Value::Float64(30.0)],
                vec![Value::Null],
                vec![Value::Float64(10.0)],
                vec![Value::Float64(20.0)],
            ],
        );
        assert_eq!(quantile(&ds, "total_sales", 0.5).unwrap(), Some(20.0));
        assert!(quantile(&ds, "missing", 0.5).is_err());
    }
}
