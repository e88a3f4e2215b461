//! Tabular previews of row sets for logs.
//!
//! Rows are copied into a polars [`DataFrame`] so previews use its table formatting.

use polars::prelude::{Column, DataFrame, NamedFrom, PlSmallStr, Series};

use crate::error::PipelineResult;
use crate::types::{DataSet, DataType, Value};

/// Convert a dataset into a polars [`DataFrame`] with one column per schema field.
///
/// Cells that do not match their field type become nulls.
pub fn to_dataframe(dataset: &DataSet) -> PipelineResult<DataFrame> {
    let columns: Vec<Column> = dataset
        .schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let name = PlSmallStr::from(field.name.as_str());
            let cells = dataset.rows.iter().map(move |row| row.get(idx));
            let series = match field.data_type {
                DataType::Int64 => Series::new(
                    name,
                    cells
                        .map(|v| match v {
                            Some(Value::Int64(x)) => Some(*x),
                            _ => None,
                        })
                        .collect::<Vec<Option<i64>>>(),
                ),
                DataType::Float64 => Series::new(
                    name,
                    cells
                        .map(|v| v.and_then(Value::as_f64))
                        .collect::<Vec<Option<f64>>>(),
                ),
                DataType::Bool => Series::new(
                    name,
                    cells
                        .map(|v| match v {
                            Some(Value::Bool(b)) => Some(*b),
                            _ => None,
                        })
                        .collect::<Vec<Option<bool>>>(),
                ),
                DataType::Utf8 => Series::new(
                    name,
                    cells
                        .map(|v| match v {
                            Some(Value::Utf8(s)) => Some(s.clone()),
                            _ => None,
                        })
                        .collect::<Vec<Option<String>>>(),
                ),
            };
            Column::from(series)
        })
        .collect();
    Ok(DataFrame::new_infer_height(columns)?)
}

/// Render the first `rows` rows of `dataset` as a text table.
///
/// Falls back to a one-line description when the table cannot be built.
pub fn render(dataset: &DataSet, rows: usize) -> String {
    match to_dataframe(&dataset.head(rows)) {
        Ok(head) => format!("{head}\n[{} of {} rows]", head.height(), dataset.row_count()),
        Err(err) => format!(
            "[preview unavailable: {err}] columns={:?} rows={}",
            dataset.schema.field_names().collect::<Vec<_>>(),
            dataset.row_count()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{render, to_dataframe};
    use crate::error::PipelineError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn summary_like() -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("Customer Name", DataType::Utf8),
                Field::new("total_orders", DataType::Int64),
                Field::new("total_sales", DataType::Float64),
                Field::new("high_value_customer", DataType::Bool),
            ]),
            (0..8)
                .map(|i| {
                    vec![
                        Value::Utf8(format!("customer-{i}")),
                        Value::Int64(i),
                        if i == 3 { Value::Null } else { Value::Float64(i as f64 * 1.5) },
                        Value::Bool(i % 2 == 0),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn dataframe_keeps_shape_and_nulls() {
        let df = to_dataframe(&summary_like()).unwrap();
        assert_eq!(df.height(), 8);
        assert_eq!(df.width(), 4);
        assert_eq!(df.column("total_sales").unwrap().null_count(), 1);
    }

    #[test]
    fn render_limits_rows() {
        let text = render(&summary_like(), 3);
        assert!(text.contains("customer-2"));
        assert!(!text.contains("customer-5"));
        assert!(text.ends_with("[3 of 8 rows]"));
    }

    #[test]
    fn duplicate_names_fall_back_to_plain_description() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("total_sales", DataType::Float64),
                Field::new("total_sales", DataType::Float64),
            ]),
            vec![vec![Value::Float64(1.0), Value::Float64(2.0)]],
        );
        assert!(matches!(to_dataframe(&ds), Err(PipelineError::Preview(_))));

        let text = render(&ds, 5);
        assert!(text.starts_with("[preview unavailable"));
        assert!(text.ends_with("rows=1"));
    }
}
