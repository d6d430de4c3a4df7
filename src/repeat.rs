//! Repeatable row groups: the editable, reorderable list of identical
//! field sets. Rendering turns the persisted column-oriented data into
//! rows plus one blank template row; persisting reverses the trip and
//! applies the empty-row-collapse rule.

use crate::html::esc_attr;
use crate::metabox::{Group, MetaBox};
use crate::rows::{to_rows, Columns, Row};
use crate::sanitize::Sanitizer;
use crate::security::{check_security, nonce_field, SecurityProvider};
use crate::storage::{self, MetaValue};
use anyhow::Result;
use opendal::Operator;
use serde_json::Value;

/// Sentinel row key carried by the template row's input names. The client
/// script rewrites it to a fresh numeric index when the template is
/// duplicated; the persister never accepts it as a data row.
pub const INPUT_ROW_KEY: &str = "_row";

/// Renders every repeatable group of the meta box: a hidden nonce input,
/// then one table per group holding the template row and the persisted
/// data rows. Rendering is pure given storage contents.
pub async fn render<S: SecurityProvider>(
    op: &Operator,
    metabox: &MetaBox,
    record_id: &str,
    security: &S,
) -> Result<String> {
    let mut html = nonce_field(metabox, security);
    for group in metabox.groups() {
        let columns = load_columns(op, record_id, group).await?;
        let rows = to_rows(&columns);
        html.push_str(&render_table(metabox, group, &rows));
    }
    Ok(html)
}

/// Loads a group's persisted column data field by field. A missing key or
/// an empty stored list means the field is absent from the columns; ragged
/// lists are passed through for [`to_rows`] to resolve.
pub async fn load_columns(op: &Operator, record_id: &str, group: &Group) -> Result<Columns> {
    let mut columns = Columns::new();
    for field in &group.fields {
        let values = storage::read_list(op, record_id, &group.storage_key(field)).await?;
        if !values.is_empty() {
            columns.insert(field.name.clone(), values);
        }
    }
    Ok(columns)
}

fn render_table(metabox: &MetaBox, group: &Group, rows: &[Row]) -> String {
    let mut html = String::new();
    html.push_str("<table class=\"wrapper table-repeater\">\n");
    html.push_str("<tbody class=\"container table-container\">\n");
    html.push_str(&render_row(metabox, group, None, INPUT_ROW_KEY, "table-template"));
    // Persisted rows are numbered from 1; the numbering round-trips into
    // the submitted input names.
    for (index, row) in rows.iter().enumerate() {
        html.push_str(&render_row(
            metabox,
            group,
            Some(row),
            &(index + 1).to_string(),
            "table-element",
        ));
    }
    html.push_str("</tbody>\n");
    html.push_str("<tfoot>\n<tr>\n<td colspan=\"3\">\n");
    html.push_str(
        "<button type=\"button\" class=\"button-add button button-primary button-large\">Add</button>\n",
    );
    html.push_str("</td>\n</tr>\n</tfoot>\n</table>\n");
    html
}

fn render_row(
    metabox: &MetaBox,
    group: &Group,
    row: Option<&Row>,
    row_key: &str,
    row_class: &str,
) -> String {
    let mut html = format!("<tr class=\"{}\">\n<td>\n", row_class);
    html.push_str(
        "<button type=\"button\" class=\"button-move-up button button-secondary\">&uarr;</button>\n",
    );
    html.push_str(
        "<button type=\"button\" class=\"button-move-down button button-secondary\">&darr;</button>\n",
    );
    html.push_str("</td>\n<td>\n");

    let count = group.fields.len();
    for (position, field) in group.fields.iter().enumerate() {
        let mut classes = String::from("large-text");
        if position == 0 || count == 1 {
            classes.push_str(" first-field");
        }
        if position + 1 == count {
            classes.push_str(" last-field");
        }
        let name = format!("{}[{}][{}]", metabox.id, group.storage_key(field), row_key);

        match row {
            Some(row) => {
                let value = row.get(&field.name).map(String::as_str).unwrap_or("");
                html.push_str(&format!(
                    "<input type=\"text\" class=\"{}\" name=\"{}\" value=\"{}\">\n",
                    classes,
                    esc_attr(&name),
                    esc_attr(value),
                ));
            }
            None => {
                let placeholder = field.placeholder.as_deref().unwrap_or("");
                html.push_str(&format!(
                    "<input type=\"text\" class=\"{}\" name=\"{}\" placeholder=\"{}\">\n",
                    classes,
                    esc_attr(&name),
                    esc_attr(placeholder),
                ));
            }
        }
    }

    html.push_str("</td>\n<td>\n");
    html.push_str(
        "<button type=\"button\" class=\"button-remove button button-secondary\">&times;</button>\n",
    );
    html.push_str("</td>\n</tr>\n");
    html
}

/// Persists a repeatable-group submission.
///
/// The wire format nests column-oriented lists under the meta box id:
/// `{ metabox_id: { "<prefix><field>": { "<row index>": value, ... } } }`.
/// Only field keys declared by the meta box's groups are considered, only
/// numeric row keys count as data rows (ordered numerically; the template
/// sentinel is dropped), and every value goes through the sanitizer.
///
/// Empty-row collapse: a field whose entire sanitized column is empty has
/// its storage key deleted; a column with at least one non-empty value is
/// stored whole, empty entries included. The decision is column-wide, so
/// removing every row clears the group while one surviving value keeps its
/// field's full list.
pub async fn save<S: SecurityProvider, Z: Sanitizer>(
    op: &Operator,
    metabox: &MetaBox,
    record_id: &str,
    submission: &Value,
    security: &S,
    sanitizer: &Z,
) -> Result<()> {
    if !check_security(metabox, submission, record_id, security) {
        return Ok(());
    }

    let Some(fields) = submission.get(&metabox.id).and_then(Value::as_object) else {
        log::debug!(
            "meta box '{}': no repeatable-group data submitted",
            metabox.id
        );
        return Ok(());
    };

    for group in metabox.groups() {
        for field in &group.fields {
            let key = group.storage_key(field);
            let Some(submitted) = fields.get(&key) else {
                continue;
            };
            let Some(values) = column_values(submitted) else {
                log::debug!("meta box '{}': malformed column for '{}'", metabox.id, key);
                continue;
            };
            let values: Vec<String> = values.iter().map(|v| sanitizer.sanitize(v)).collect();

            if values.iter().all(|v| v.is_empty()) {
                storage::delete_meta(op, record_id, &key).await?;
            } else {
                storage::write_meta(op, record_id, &key, &MetaValue::List(values)).await?;
            }
        }
    }

    Ok(())
}

/// Extracts one submitted column in row order. Objects are keyed by row
/// index: numeric keys are sorted numerically, anything else (notably the
/// template sentinel) is ignored. Arrays are taken in order. Any other
/// shape is malformed.
fn column_values(submitted: &Value) -> Option<Vec<String>> {
    match submitted {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
        ),
        Value::Object(map) => {
            let mut indexed: Vec<(usize, String)> = map
                .iter()
                .filter_map(|(row_key, value)| {
                    let index = row_key.parse::<usize>().ok()?;
                    Some((index, value.as_str()?.to_string()))
                })
                .collect();
            indexed.sort_by_key(|(index, _)| *index);
            Some(indexed.into_iter().map(|(_, value)| value).collect())
        }
        _ => None,
    }
}
