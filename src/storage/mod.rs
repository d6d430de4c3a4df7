//! Meta storage: one JSON document per `(record_id, field_key)` under the
//! record's meta directory, holding either a single string or a string
//! list. The operator is the external collaborator; this module only fixes
//! the key layout and the stored shape.

pub mod operator;

pub use operator::operator_from_uri;

use anyhow::{Context, Result};
use futures::TryStreamExt;
use opendal::{EntryMode, Operator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("meta value for '{0}' is not a string or a list of strings")]
    InvalidShape(String),
}

/// Stored shape of one meta key: flat and grouped-fixed fields persist a
/// single scalar, repeatable-group fields an ordered list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum MetaValue {
    Single(String),
    List(Vec<String>),
}

fn meta_dir(record_id: &str) -> String {
    format!("records/{}/meta/", record_id)
}

fn meta_path(record_id: &str, key: &str) -> String {
    format!("records/{}/meta/{}.json", record_id, key)
}

pub async fn read_meta(op: &Operator, record_id: &str, key: &str) -> Result<Option<MetaValue>> {
    let path = meta_path(record_id, key);
    if !op.exists(&path).await? {
        return Ok(None);
    }
    let bytes = op.read(&path).await?;
    let value: Value = serde_json::from_slice(&bytes.to_vec())
        .context(format!("meta value at {} is not valid JSON", path))?;
    Ok(Some(decode(key, &value)?))
}

pub async fn write_meta(
    op: &Operator,
    record_id: &str,
    key: &str,
    value: &MetaValue,
) -> Result<()> {
    let path = meta_path(record_id, key);
    let content = serde_json::to_vec_pretty(value)?;
    op.write(&path, content).await?;
    log::debug!("wrote meta {}", path);
    Ok(())
}

/// Deletes a meta key. Missing keys are tolerated.
pub async fn delete_meta(op: &Operator, record_id: &str, key: &str) -> Result<()> {
    let path = meta_path(record_id, key);
    if op.exists(&path).await? {
        op.delete(&path).await?;
        log::debug!("deleted meta {}", path);
    }
    Ok(())
}

/// Reads a scalar. A stored list yields its first entry; a missing key
/// yields the empty string.
pub async fn read_single(op: &Operator, record_id: &str, key: &str) -> Result<String> {
    Ok(match read_meta(op, record_id, key).await? {
        Some(MetaValue::Single(value)) => value,
        Some(MetaValue::List(values)) => values.into_iter().next().unwrap_or_default(),
        None => String::new(),
    })
}

/// Reads a list. A stored scalar is promoted to a one-element list; a
/// missing key yields an empty list.
pub async fn read_list(op: &Operator, record_id: &str, key: &str) -> Result<Vec<String>> {
    Ok(match read_meta(op, record_id, key).await? {
        Some(MetaValue::List(values)) => values,
        Some(MetaValue::Single(value)) => vec![value],
        None => Vec::new(),
    })
}

/// Lists every stored meta key for a record, sorted.
pub async fn list_meta_keys(op: &Operator, record_id: &str) -> Result<Vec<String>> {
    let dir = meta_dir(record_id);
    // Not every backend can stat a directory that was never explicitly
    // created, so a missing prefix is detected through the lister itself.
    let mut lister = match op.lister(&dir).await {
        Ok(lister) => lister,
        Err(e) if e.kind() == opendal::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut keys = Vec::new();
    while let Some(entry) = lister.try_next().await? {
        if entry.metadata().mode() != EntryMode::FILE {
            continue;
        }
        let name = entry.name();
        let file_name = name.rsplit('/').next().unwrap_or(name);
        if let Some(key) = file_name.strip_suffix(".json") {
            keys.push(key.to_string());
        }
    }
    keys.sort();
    Ok(keys)
}

fn decode(key: &str, value: &Value) -> Result<MetaValue, StorageError> {
    match value {
        Value::String(s) => Ok(MetaValue::Single(s.clone())),
        Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => values.push(s.clone()),
                    _ => return Err(StorageError::InvalidShape(key.to_string())),
                }
            }
            Ok(MetaValue::List(values))
        }
        _ => Err(StorageError::InvalidShape(key.to_string())),
    }
}
