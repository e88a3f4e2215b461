//! Null replacement.

use crate::types::{DataSet, DataType, Value};

/// Replace nulls in numeric columns with zero of the column's type.
///
/// Text and boolean columns are left untouched.
pub fn fill_numeric_nulls(dataset: &DataSet) -> DataSet {
    let types: Vec<DataType> = dataset.schema.fields.iter().map(|f| f.data_type).collect();
    dataset.map_rows(|row| {
        row.iter()
            .zip(&types)
            .map(|(value, data_type)| match (value, data_type) {
                (Value::Null, DataType::Int64) => Value::Int64(0),
                (Value::Null, DataType::Float64) => Value::Float64(0.0),
                _ => value.clone(),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::fill_numeric_nulls;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    #[test]
    fn only_numeric_nulls_are_filled() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("name", DataType::Utf8),
                Field::new("orders", DataType::Int64),
                Field::new("sales", DataType::Float64),
            ]),
            vec![
                vec![Value::Null, Value::Null, Value::Null],
                vec![Value::Utf8("x".into()), Value::Int64(2), Value::Float64(1.5)],
            ],
        );

        let out = fill_numeric_nulls(&ds);
        assert_eq!(out.rows[0], vec![Value::Null, Value::Int64(0), Value::Float64(0.0)]);
        assert_eq!(out.rows[1], ds.rows[1]);
    }
}
