//! Column names of the source tables and of the `sales_summary` table.

pub const ORDER_ID: &str = "Order ID";
pub const CUSTOMER_ID: &str = "Customer ID";
pub const CUSTOMER_NAME: &str = "Customer Name";
pub const PRODUCT_ID: &str = "Product ID";
pub const PRODUCT_NAME: &str = "Product Name";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const SALES: &str = "Sales";
pub const PROFIT: &str = "Profit";

pub const TOTAL_SALES: &str = "total_sales";
pub const TOTAL_PROFIT: &str = "total_profit";
pub const TOTAL_ORDERS: &str = "total_orders";

pub const HIGH_VALUE_CUSTOMER: &str = "high_value_customer";
pub const PROFIT_MARGIN: &str = "profit_margin";
pub const AVG_ORDER_VALUE: &str = "avg_order_value";
pub const PRODUCT_RANK_PER_CUSTOMER: &str = "product_rank_per_customer";
pub const SALES_TO_PROFIT_RATIO: &str = "sales_to_profit_ratio";
pub const CATEGORY_SALES_PCT: &str = "category_sales_pct";
pub const CATEGORY_PROFIT_RATIO: &str = "category_profit_ratio";

/// Columns of `sales_summary`, in table order.
pub const SUMMARY_COLUMNS: [&str; 16] = [
    CUSTOMER_ID,
    CUSTOMER_NAME,
    PRODUCT_ID,
    PRODUCT_NAME,
    CATEGORY,
    SUB_CATEGORY,
    TOTAL_SALES,
    TOTAL_PROFIT,
    TOTAL_ORDERS,
    HIGH_VALUE_CUSTOMER,
    PROFIT_MARGIN,
    AVG_ORDER_VALUE,
    PRODUCT_RANK_PER_CUSTOMER,
    SALES_TO_PROFIT_RATIO,
    CATEGORY_SALES_PCT,
    CATEGORY_PROFIT_RATIO,
];
