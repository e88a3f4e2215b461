//! Column reductions for [`crate::types::DataSet`].

use crate::types::{DataSet, DataType, Value};

/// Sum a numeric column, ignoring nulls.
///
/// - Returns `None` if `column` does not exist in the schema.
/// - Keeps the column type: `Int64` columns sum to `Value::Int64`, `Float64` to
///   `Value::Float64`.
/// - Returns `Some(Value::Null)` when there is no non-null value or the column is not numeric.
pub fn sum(dataset: &DataSet, column: &str) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;
    let cells = dataset.rows.iter().filter_map(move |row| row.get(idx));

    let out = match dataset.schema.fields[idx].data_type {
        DataType::Int64 => fold(cells.filter_map(|v| match v {
            Value::Int64(x) => Some(*x),
            _ => None,
        }))
        .map_or(Value::Null, Value::Int64),
        DataType::Float64 => fold(cells.filter_map(|v| match v {
            Value::Float64(x) => Some(*x),
            _ => None,
        }))
        .map_or(Value::Null, Value::Float64),
        DataType::Bool | DataType::Utf8 => Value::Null,
    };
    Some(out)
}

fn fold<T, I>(values: I) -> Option<T>
where
    T: Copy + std::ops::Add<Output = T>,
    I: Iterator<Item = T>,
{
    values.reduce(|acc, v| acc + v)
}

#[cfg(test)]
mod tests {
    use super::sum;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sales_with_nulls() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("orders", DataType::Int64),
            Field::new("total_sales", DataType::Float64),
            Field::new("Category", DataType::Utf8),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Float64(10.0), Value::Utf8("Tools".into())],
            vec![Value::Int64(2), Value::Null, Value::Utf8("Tools".into())],
            vec![Value::Int64(3), Value::Float64(5.5), Value::Null],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn sum_skips_nulls_and_keeps_type() {
        let ds = sales_with_nulls();
        assert_eq!(sum(&ds, "total_sales"), Some(Value::Float64(15.5)));
        assert_eq!(sum(&ds, "orders"), Some(Value::Int64(6)));
    }

    #[test]
    fn missing_and_non_numeric_columns() {
        let ds = sales_with_nulls();
        assert_eq!(sum(&ds, "missing"), None);
        assert_eq!(sum(&ds, "Category"), Some(Value::Null));

        let all_null = DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Float64)]),
            vec![vec![Value::Null]],
        );
        assert_eq!(sum(&all_null, "x"), Some(Value::Null));
    }
}
