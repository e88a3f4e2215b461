//! Dense ranking within partitions.

use std::collections::HashMap;

use crate::error::PipelineResult;
use crate::types::{DataSet, Value};

/// Dense rank of `order_by` within each `partition_by` group, one value per row. The largest
/// value of a partition gets rank 1.
///
/// Equal values share a rank and the next distinct value gets the next integer, so ranks in a
/// partition are `1..=k` with no gaps. Rows whose `order_by` cell is null (or non-numeric) get
/// [`Value::Null`]; rows with a null partition key form their own partition.
pub fn dense_rank(
    dataset: &DataSet,
    partition_by: &str,
    order_by: &str,
) -> PipelineResult<Vec<Value>> {
    let part_idx = dataset.schema.require(partition_by)?;
    let value_idx = dataset.schema.require(order_by)?;

    let keyed: Vec<(Option<String>, Option<f64>)> = dataset
        .rows
        .iter()
        .map(|row| {
            (
                row.get(part_idx).and_then(Value::key),
                row.get(value_idx).and_then(Value::as_f64),
            )
        })
        .collect();

    let mut distinct: HashMap<&Option<String>, Vec<f64>> = HashMap::new();
    for (key, value) in &keyed {
        if let Some(v) = value {
            distinct.entry(key).or_default().push(*v);
        }
    }
    let cmp = |a: &f64, b: &f64| b.total_cmp(a);
    for values in distinct.values_mut() {
        values.sort_by(cmp);
        values.dedup_by(|a, b| a.total_cmp(b).is_eq());
    }

    Ok(keyed
        .iter()
        .map(|(key, value)| {
            let (Some(v), Some(values)) = (value, distinct.get(key)) else {
                return Value::Null;
            };
            match values.binary_search_by(|candidate| cmp(candidate, v)) {
                Ok(pos) => Value::Int64(pos as i64 + 1),
                Err(_) => Value::Null,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::dense_rank;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn pairs(rows: &[(&str, f64)]) -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("Customer ID", DataType::Utf8),
                Field::new("total_sales", DataType::Float64),
            ]),
            rows.iter()
                .map(|(c, s)| vec![Value::Utf8((*c).to_string()), Value::Float64(*s)])
                .collect(),
        )
    }

    fn ranks(values: Vec<Value>) -> Vec<i64> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Int64(r) => r,
                other => panic!("expected rank, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn ties_share_rank_without_gaps() {
        let ds = pairs(&[("C1", 50.0), ("C1", 100.0), ("C1", 50.0), ("C1", 10.0)]);
        let out = dense_rank(&ds, "Customer ID", "total_sales").unwrap();
        assert_eq!(ranks(out), vec![2, 1, 2, 3]);
    }

    #[test]
    fn partitions_rank_independently() {
        let ds = pairs(&[("C1", 5.0), ("C2", 1.0), ("C1", 9.0), ("C2", 3.0)]);
        let out = dense_rank(&ds, "Customer ID", "total_sales").unwrap();
        assert_eq!(ranks(out), vec![2, 2, 1, 1]);
    }

    #[test]
    fn null_values_are_unranked() {
        let mut ds = pairs(&[("C1", 5.0), ("C1", 0.0)]);
        ds.rows[1][1] = Value::Null;
        let out = dense_rank(&ds, "Customer ID", "total_sales").unwrap();
        assert_eq!(out, vec![Value::Int64(1), Value::Null]);
    }
}
