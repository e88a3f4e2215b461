//! Category-level roll-up.
//!
//! Sales and profit are summed per (Category, Sub-Category). Each group's share of all sales
//! (`category_sales_pct`) and its profit ratio (`category_profit_ratio`) are then merged back
//! onto every summary row of that group. Both are null when their denominator is zero.

use crate::error::PipelineResult;
use crate::processing::{group_sums, left_join, sum};
use crate::types::{DataSet, DataType, Field, Value};

use super::columns::{
    CATEGORY, CATEGORY_PROFIT_RATIO, CATEGORY_SALES_PCT, SUB_CATEGORY, TOTAL_PROFIT, TOTAL_SALES,
};

/// One row per (Category, Sub-Category): the key, summed `total_sales` and `total_profit`,
/// `category_sales_pct` and `category_profit_ratio`.
pub fn category_rollup(summary: &DataSet) -> PipelineResult<DataSet> {
    let groups = group_sums(summary, &[CATEGORY, SUB_CATEGORY], &[TOTAL_SALES, TOTAL_PROFIT])?;
    let grand_total = sum(&groups, TOTAL_SALES)
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    let sales: Vec<f64> = groups.column(TOTAL_SALES)?.filter_map(Value::as_f64).collect();
    let profit: Vec<f64> = groups.column(TOTAL_PROFIT)?.filter_map(Value::as_f64).collect();
    let sales_pct = sales.iter().map(|s| share(*s, grand_total)).collect();
    let profit_ratio = profit.iter().zip(&sales).map(|(p, s)| share(*p, *s)).collect();

    groups
        .with_column(Field::new(CATEGORY_SALES_PCT, DataType::Float64), sales_pct)?
        .with_column(Field::new(CATEGORY_PROFIT_RATIO, DataType::Float64), profit_ratio)
}

/// Left-merge the roll-up ratios onto `summary`, preserving its rows and order.
pub fn merge_category_rollup(summary: DataSet) -> PipelineResult<DataSet> {
    let rollup = category_rollup(&summary)?;
    left_join(
        summary,
        &rollup,
        &[CATEGORY, SUB_CATEGORY],
        &[CATEGORY_SALES_PCT, CATEGORY_PROFIT_RATIO],
    )
}

fn share(part: f64, whole: f64) -> Value {
    if whole == 0.0 {
        Value::Null
    } else {
        Value::finite(part / whole)
    }
}
