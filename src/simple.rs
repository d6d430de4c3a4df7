//! Flat fields: one input per field, one stored scalar per field name.

use crate::field::FieldKind;
use crate::html::{esc_attr, esc_text};
use crate::metabox::MetaBox;
use crate::sanitize;
use crate::security::{check_security, nonce_field, SecurityProvider};
use crate::storage::{self, MetaValue};
use anyhow::Result;
use opendal::Operator;
use serde_json::Value;
use uuid::Uuid;

/// Renders the meta box for a record: a hidden nonce input followed by one
/// paragraph per field, each showing the persisted value.
pub async fn render<S: SecurityProvider>(
    op: &Operator,
    metabox: &MetaBox,
    record_id: &str,
    security: &S,
) -> Result<String> {
    let mut html = nonce_field(metabox, security);

    for field in metabox.fields() {
        let value = storage::read_single(op, record_id, &field.name).await?;
        let placeholder = field.placeholder.as_deref().unwrap_or("");

        match &field.kind {
            FieldKind::Textarea { rows } => {
                html.push_str(&format!(
                    "<p><textarea class=\"large-text\" name=\"{}\" placeholder=\"{}\" rows=\"{}\">{}</textarea></p>\n",
                    esc_attr(&field.name),
                    esc_attr(placeholder),
                    rows,
                    esc_text(&value),
                ));
            }
            FieldKind::Editor { rows } => {
                let element_id = format!("rich-text-{}", Uuid::new_v4().simple());
                html.push_str(&format!(
                    "<p><textarea id=\"{}\" class=\"large-text rich-text\" name=\"{}\" rows=\"{}\">{}</textarea></p>\n",
                    element_id,
                    esc_attr(&field.name),
                    rows,
                    esc_text(&value),
                ));
            }
            kind => {
                let input_type = kind.input_type().unwrap_or("text");
                html.push_str(&format!(
                    "<p><input type=\"{}\" class=\"large-text\" name=\"{}\" value=\"{}\" placeholder=\"{}\"></p>\n",
                    input_type,
                    esc_attr(&field.name),
                    esc_attr(&field.display_value(&value)),
                    esc_attr(placeholder),
                ));
            }
        }
    }

    Ok(html)
}

/// Persists a submission. Fields absent from the submission are left
/// untouched; a field sanitized down to the empty string has its stored
/// key deleted. A failed security check makes the whole call a no-op.
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

    for field in metabox.fields() {
        let Some(raw) = submission.get(&field.name).and_then(Value::as_str) else {
            continue;
        };
        let value = sanitize::for_kind(&field.kind, raw);
        if value.is_empty() {
            storage::delete_meta(op, record_id, &field.name).await?;
        } else {
            storage::write_meta(op, record_id, &field.name, &MetaValue::Single(value)).await?;
        }
    }

    Ok(())
}
