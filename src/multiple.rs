//! Grouped-but-fixed fields: every group renders as one table row, every
//! field stores one scalar under its prefixed key. No repetition.

use crate::field::{Field, FieldKind};
use crate::html::{esc_attr, esc_text};
use crate::metabox::MetaBox;
use crate::sanitize;
use crate::security::{check_security, nonce_field, SecurityProvider};
use crate::storage::{self, MetaValue};
use anyhow::Result;
use opendal::Operator;
use serde_json::Value;

/// Renders all groups as a single table, one row per group, alternating
/// even/odd row classes.
pub async fn render<S: SecurityProvider>(
    op: &Operator,
    metabox: &MetaBox,
    record_id: &str,
    security: &S,
) -> Result<String> {
    let mut html = nonce_field(metabox, security);
    html.push_str("<table class=\"form-table table-tight\">\n");

    for (index, group) in metabox.groups().iter().enumerate() {
        let row_class = if index % 2 == 0 { "even-row" } else { "odd-row" };
        html.push_str(&format!("<tr class=\"form-field {}\">\n", row_class));

        let count = group.fields.len();
        for (position, field) in group.fields.iter().enumerate() {
            let key = group.storage_key(field);
            let value = storage::read_single(op, record_id, &key).await?;
            html.push_str("<td>");
            html.push_str(&render_field(field, &key, &value, position, count));
            html.push_str("</td>\n");
        }

        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n");
    Ok(html)
}

fn render_field(field: &Field, key: &str, value: &str, position: usize, count: usize) -> String {
    let field_class = if position == 0 {
        "first-field"
    } else if position + 1 == count {
        "last-field"
    } else {
        ""
    };
    let placeholder = field.placeholder.as_deref().unwrap_or("");

    match &field.kind {
        FieldKind::Textarea { rows } | FieldKind::Editor { rows } => format!(
            "<textarea class=\"large-text {}\" name=\"{}\" placeholder=\"{}\" rows=\"{}\">{}</textarea>",
            field_class,
            esc_attr(key),
            esc_attr(placeholder),
            rows,
            esc_text(value),
        ),
        kind => format!(
            "<input type=\"{}\" class=\"large-text {}\" name=\"{}\" value=\"{}\" placeholder=\"{}\">",
            kind.input_type().unwrap_or("text"),
            field_class,
            esc_attr(key),
            esc_attr(&field.display_value(value)),
            esc_attr(placeholder),
        ),
    }
}

/// Persists a submission keyed by prefixed field names. Same scalar rules
/// as the flat layout: absent keys untouched, empty values deleted, failed
/// security a silent no-op.
pub async fn save<S: SecurityProvider>(
    op: &Operator,
    metabox: &MetaBox,
    record_id: &str,
    submission: &Value,
    security: &S,
) -> Result<()> {
    if !check_security(metabox, submission, record_id, security) {
        return Ok(());
    }

    for group in metabox.groups() {
        for field in &group.fields {
            let key = group.storage_key(field);
            let Some(raw) = submission.get(&key).and_then(Value::as_str) else {
                continue;
            };
            let value = sanitize::for_kind(&field.kind, raw);
            if value.is_empty() {
                storage::delete_meta(op, record_id, &key).await?;
            } else {
                storage::write_meta(op, record_id, &key, &MetaValue::Single(value)).await?;
            }
        }
    }

    Ok(())
}
