//! Group-by sums and key joins.

use std::collections::{BTreeMap, HashMap};

use crate::error::PipelineResult;
use crate::types::{DataSet, DataType, Field, Schema, Value};

type GroupKey = Vec<Option<String>>;

fn key_indexes(dataset: &DataSet, keys: &[&str]) -> PipelineResult<Vec<usize>> {
    keys.iter().map(|k| dataset.schema.require(k)).collect()
}

fn row_key(row: &[Value], idxs: &[usize]) -> GroupKey {
    idxs.iter()
        .map(|&i| row.get(i).and_then(Value::key))
        .collect()
}

/// Group rows by `keys` and sum each of the `values` columns per group.
///
/// The output has the key columns (original types) followed by one [`DataType::Float64`] sum
/// per value column, one row per distinct key combination, sorted by key. Nulls are skipped
/// when summing; a group with no numeric values sums to `0.0`.
pub fn group_sums(dataset: &DataSet, keys: &[&str], values: &[&str]) -> PipelineResult<DataSet> {
    let key_idxs = key_indexes(dataset, keys)?;
    let value_idxs: Vec<usize> = values
        .iter()
        .map(|v| dataset.schema.require(v))
        .collect::<PipelineResult<_>>()?;

    let mut groups: BTreeMap<GroupKey, (Vec<Value>, Vec<f64>)> = BTreeMap::new();
    for row in &dataset.rows {
        let (_, sums) = groups.entry(row_key(row, &key_idxs)).or_insert_with(|| {
            let key_values = key_idxs
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                .collect();
            (key_values, vec![0.0; value_idxs.len()])
        });
        for (sum, &idx) in sums.iter_mut().zip(&value_idxs) {
            if let Some(v) = row.get(idx).and_then(Value::as_f64) {
                *sum += v;
            }
        }
    }

    let fields = key_idxs
        .iter()
        .map(|&i| dataset.schema.fields[i].clone())
        .chain(values.iter().map(|v| Field::new(*v, DataType::Float64)))
        .collect();
    let rows = groups
        .into_values()
        .map(|(mut key_values, sums)| {
            key_values.extend(sums.into_iter().map(Value::Float64));
            key_values
        })
        .collect();

    Ok(DataSet::new(Schema::new(fields), rows))
}

/// Left join: append the `take` columns of `right` to every row of `left` with equal `on` keys.
///
/// Row order and count of `left` are preserved. `right` is expected to hold each key at most
/// once; the first matching row wins. Rows without a match get [`Value::Null`] in every taken
/// column.
pub fn left_join(
    left: DataSet,
    right: &DataSet,
    on: &[&str],
    take: &[&str],
) -> PipelineResult<DataSet> {
    let left_idxs = key_indexes(&left, on)?;
    let right_idxs = key_indexes(right, on)?;
    let take_idxs: Vec<usize> = take
        .iter()
        .map(|t| right.schema.require(t))
        .collect::<PipelineResult<_>>()?;

    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    for (pos, row) in right.rows.iter().enumerate() {
        index.entry(row_key(row, &right_idxs)).or_insert(pos);
    }

    let matches: Vec<Option<&Vec<Value>>> = left
        .rows
        .iter()
        .map(|row| index.get(&row_key(row, &left_idxs)).map(|&pos| &right.rows[pos]))
        .collect();

    let mut columns = Vec::with_capacity(take_idxs.len());
    for &idx in &take_idxs {
        let values = matches
            .iter()
            .map(|m| m.and_then(|row| row.get(idx)).cloned().unwrap_or(Value::Null))
            .collect::<Vec<_>>();
        columns.push((right.schema.fields[idx].clone(), values));
    }

    columns
        .into_iter()
        .try_fold(left, |acc, (field, values)| acc.with_column(field, values))
}

#[cfg(test)]
mod tests {
    use super::{group_sums, left_join};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn s(v: &str) -> Value {
        Value::Utf8(v.to_string())
    }

    fn lines() -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("Category", DataType::Utf8),
                Field::new("Sub-Category", DataType::Utf8),
                Field::new("total_sales", DataType::Float64),
                Field::new("total_profit", DataType::Float64),
            ]),
            vec![
                vec![s("Tools"), s("Hand"), Value::Float64(100.0), Value::Float64(20.0)],
                vec![s("Garden"), s("Hose"), Value::Float64(40.0), Value::Null],
                vec![s("Tools"), s("Hand"), Value::Float64(60.0), Value::Float64(-5.0)],
                vec![s("Tools"), s("Power"), Value::Float64(10.0), Value::Float64(1.0)],
            ],
        )
    }

    #[test]
    fn group_sums_one_row_per_key_sorted() {
        let out = group_sums(
            &lines(),
            &["Category", "Sub-Category"],
            &["total_sales", "total_profit"],
        )
        .unwrap();

        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["Category", "Sub-Category", "total_sales", "total_profit"]
        );
        assert_eq!(
            out.rows,
            vec![
                vec![s("Garden"), s("Hose"), Value::Float64(40.0), Value::Float64(0.0)],
                vec![s("Tools"), s("Hand"), Value::Float64(160.0), Value::Float64(15.0)],
                vec![s("Tools"), s("Power"), Value::Float64(10.0), Value::Float64(1.0)],
            ]
        );
    }

    #[test]
    fn left_join_preserves_left_rows_and_nulls_unmatched() {
        let right = DataSet::new(
            Schema::new(vec![
                Field::new("Category", DataType::Utf8),
                Field::new("Sub-Category", DataType::Utf8),
                Field::new("pct", DataType::Float64),
            ]),
            vec![vec![s("Tools"), s("Hand"), Value::Float64(0.5)]],
        );

        let out = left_join(lines(), &right, &["Category", "Sub-Category"], &["pct"]).unwrap();
        assert_eq!(out.row_count(), 4);
        let pct: Vec<Value> = out.column("pct").unwrap().cloned().collect();
        assert_eq!(
            pct,
            vec![Value::Float64(0.5), Value::Null, Value::Float64(0.5), Value::Null]
        );
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let err = group_sums(&lines(), &["Region"], &["total_sales"]).unwrap_err();
        assert!(err.to_string().contains("missing required column 'Region'"));
    }
}
