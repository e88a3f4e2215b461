//! Derived per-row metrics of the sales summary.

use crate::error::{PipelineError, PipelineResult};
use crate::processing::{dense_rank, fill_numeric_nulls, quantile};
use crate::types::{DataSet, DataType, Field, Value};

use super::columns::{
    AVG_ORDER_VALUE, CUSTOMER_ID, HIGH_VALUE_CUSTOMER, PRODUCT_RANK_PER_CUSTOMER, PROFIT_MARGIN,
    SALES_TO_PROFIT_RATIO, TOTAL_ORDERS, TOTAL_PROFIT, TOTAL_SALES,
};
use super::rollup::merge_category_rollup;

/// Rows with `total_sales` strictly above this quantile are high-value.
pub const HIGH_VALUE_QUANTILE: f64 = 0.9;

/// Compute the derived columns of the summary from an aggregate row set.
///
/// Null numeric cells are first replaced with zero. Then, in order:
///
/// 1. `high_value_customer`: `total_sales` above the 0.9 quantile of `total_sales`
/// 2. `profit_margin`: `total_profit / total_sales`
/// 3. `avg_order_value`: `total_sales / total_orders`
/// 4. `product_rank_per_customer`: dense rank of `total_sales` (largest first) per `Customer ID`
/// 5. `sales_to_profit_ratio`: `total_sales / total_profit`
/// 6. `category_sales_pct` and `category_profit_ratio` from the category roll-up (see
///    [`super::rollup`])
///
/// The three ratios divide by 1 instead of 0, so a zero denominator yields the numerator.
pub fn derive_metrics(aggregate: &DataSet) -> PipelineResult<DataSet> {
    let ds = fill_numeric_nulls(aggregate);
    let sales = numeric_column(&ds, TOTAL_SALES)?;
    let profit = numeric_column(&ds, TOTAL_PROFIT)?;
    let orders = numeric_column(&ds, TOTAL_ORDERS)?;

    let threshold = quantile(&ds, TOTAL_SALES, HIGH_VALUE_QUANTILE)?;
    let high_value = sales
        .iter()
        .map(|s| Value::Bool(threshold.is_some_and(|t| *s > t)))
        .collect();
    let profit_margin = guarded_ratios(&profit, &sales);
    let avg_order_value = guarded_ratios(&sales, &orders);
    let rank = dense_rank(&ds, CUSTOMER_ID, TOTAL_SALES)?;
    let sales_to_profit = guarded_ratios(&sales, &profit);

    let ds = ds
        .with_column(Field::new(HIGH_VALUE_CUSTOMER, DataType::Bool), high_value)?
        .with_column(Field::new(PROFIT_MARGIN, DataType::Float64), profit_margin)?
        .with_column(Field::new(AVG_ORDER_VALUE, DataType::Float64), avg_order_value)?
        .with_column(Field::new(PRODUCT_RANK_PER_CUSTOMER, DataType::Int64), rank)?
        .with_column(Field::new(SALES_TO_PROFIT_RATIO, DataType::Float64), sales_to_profit)?;

    merge_category_rollup(ds)
}

/// `numerator / denominator`, with a zero denominator replaced by 1.
pub fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    }
}

fn guarded_ratios(numerators: &[f64], denominators: &[f64]) -> Vec<Value> {
    numerators
        .iter()
        .zip(denominators)
        .map(|(n, d)| Value::Float64(guarded_div(*n, *d)))
        .collect()
}

fn numeric_column(ds: &DataSet, name: &str) -> PipelineResult<Vec<f64>> {
    let idx = ds.schema.require(name)?;
    if !ds.schema.fields[idx].data_type.is_numeric() {
        return Err(PipelineError::schema(format!(
            "column '{name}' must be numeric, found {:?}",
            ds.schema.fields[idx].data_type
        )));
    }
    Ok(ds.column(name)?.map(|v| v.as_f64().unwrap_or(0.0)).collect())
}
