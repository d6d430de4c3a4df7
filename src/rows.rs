//! Transform between the column-oriented persisted shape of a repeatable
//! group (one value list per field) and the row-oriented shape used while
//! editing (an ordered list of rows, one value per field).

use std::collections::{BTreeMap, BTreeSet};

/// Persisted shape: field short-name to ordered values, index = row number.
pub type Columns = BTreeMap<String, Vec<String>>;

/// Edit-time shape of a single row: field short-name to value.
pub type Row = BTreeMap<String, String>;

/// Converts column-oriented data to ordered rows.
///
/// Ragged columns are defined behavior, not an error: a row exists as soon
/// as any field supplies a value at that index, and shorter columns simply
/// leave later rows without that key. The row count is the maximum list
/// length. No emptiness filtering happens here; that is a persist-time rule.
pub fn to_rows(columns: &Columns) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::new();
    for (field, values) in columns {
        if values.len() > rows.len() {
            rows.resize_with(values.len(), Row::new);
        }
        for (index, value) in values.iter().enumerate() {
            rows[index].insert(field.clone(), value.clone());
        }
    }
    rows
}

/// Converts ordered rows back to column-oriented data.
///
/// Every field name appearing in any row gets a list with one entry per
/// row, in row order, substituting an empty string where a row lacks the
/// key. All output lists therefore have the same length. This is
/// deliberately asymmetric with [`to_rows`]: submitted data names every
/// field on every row, so padding restores positional alignment.
pub fn to_columns(rows: &[Row]) -> Columns {
    let mut names: BTreeSet<&String> = BTreeSet::new();
    for row in rows {
        names.extend(row.keys());
    }

    let mut columns = Columns::new();
    for name in names {
        let values = rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or_default())
            .collect();
        columns.insert(name.clone(), values);
    }
    columns
}
