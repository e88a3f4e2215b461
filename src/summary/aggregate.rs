//! The grouped aggregation and dimension join.

use crate::error::{PipelineError, PipelineResult};
use crate::store::{quote_ident, Store};
use crate::types::{DataSet, DataType};

use super::columns::{
    CATEGORY, CUSTOMER_ID, CUSTOMER_NAME, ORDER_ID, PRODUCT_ID, PRODUCT_NAME, PROFIT, SALES,
    SUB_CATEGORY, TOTAL_ORDERS, TOTAL_PROFIT, TOTAL_SALES,
};

/// Orders fact table.
pub const ORDERS_TABLE: &str = "orders";
/// Customer dimension table.
pub const CUSTOMERS_TABLE: &str = "customers";
/// Product dimension table.
pub const PRODUCTS_TABLE: &str = "products";

/// Source tables and the columns the aggregation reads from each.
pub const SOURCE_TABLES: [(&str, &[&str]); 3] = [
    (ORDERS_TABLE, &[ORDER_ID, CUSTOMER_ID, PRODUCT_ID, SALES, PROFIT]),
    (CUSTOMERS_TABLE, &[CUSTOMER_ID, CUSTOMER_NAME]),
    (PRODUCTS_TABLE, &[PRODUCT_ID, PRODUCT_NAME, CATEGORY, SUB_CATEGORY]),
];

const AGGREGATE_SQL: &str = r#"
WITH agg_orders AS (
    SELECT
        "Customer ID",
        "Product ID",
        CAST(SUM("Sales") AS REAL) AS total_sales,
        CAST(SUM("Profit") AS REAL) AS total_profit,
        COUNT("Order ID") AS total_orders
    FROM orders
    GROUP BY "Customer ID", "Product ID"
)
SELECT
    ao."Customer ID",
    c."Customer Name",
    ao."Product ID",
    p."Product Name",
    p."Category",
    p."Sub-Category",
    ao.total_sales,
    ao.total_profit,
    ao.total_orders
FROM agg_orders ao
JOIN customers c ON ao."Customer ID" = c."Customer ID"
JOIN products p ON ao."Product ID" = p."Product ID"
ORDER BY ao.total_sales DESC
"#;

const ORDER_PAIRS_SQL: &str =
    r#"SELECT COUNT(*) FROM (SELECT DISTINCT "Customer ID", "Product ID" FROM orders)"#;

/// Output of [`build_aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// One row per (Customer ID, Product ID) pair with known customer and product, ordered by
    /// `total_sales` descending.
    pub dataset: DataSet,
    /// Distinct (Customer ID, Product ID) pairs in `orders`.
    pub order_pairs: usize,
    /// Pairs the inner join dropped because the customer or product is unknown.
    pub dropped_pairs: usize,
}

/// Aggregate `orders` per customer/product and join the customer and product attributes.
///
/// Fails with [`PipelineError::Query`] when a source table or column is missing or when the
/// join produces no rows.
pub fn build_aggregate(store: &Store) -> PipelineResult<AggregateResult> {
    check_sources(store)?;

    let mut dataset = store.query(AGGREGATE_SQL)?;
    let order_pairs: i64 = store
        .connection()
        .query_row(ORDER_PAIRS_SQL, [], |row| row.get(0))?;
    let order_pairs = usize::try_from(order_pairs).unwrap_or_default();

    if dataset.row_count() == 0 {
        return Err(PipelineError::query(format!(
            "summary query returned no rows ({order_pairs} order pairs, none matched a known customer and product)"
        )));
    }

    // An all-null sum column cannot be typed from its values.
    for (name, data_type) in [
        (TOTAL_SALES, DataType::Float64),
        (TOTAL_PROFIT, DataType::Float64),
        (TOTAL_ORDERS, DataType::Int64),
    ] {
        let idx = dataset.schema.require(name)?;
        dataset.schema.fields[idx].data_type = data_type;
    }

    let dropped_pairs = order_pairs.saturating_sub(dataset.row_count());
    Ok(AggregateResult {
        dataset,
        order_pairs,
        dropped_pairs,
    })
}

fn check_sources(store: &Store) -> PipelineResult<()> {
    for (table, required) in SOURCE_TABLES {
        if !store.table_exists(table)? {
            return Err(PipelineError::query(format!(
                "missing source table {}",
                quote_ident(table)
            )));
        }
        let columns = store.table_columns(table)?;
        if let Some(missing) = required.iter().find(|c| !columns.iter().any(|have| have == *c)) {
            return Err(PipelineError::query(format!(
                "source table {} has no column {}. columns={columns:?}",
                quote_ident(table),
                quote_ident(missing)
            )));
        }
    }
    Ok(())
}
