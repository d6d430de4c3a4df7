//! Meta-box configuration: the set of flat fields and field groups attached
//! to a record editor, plus the keys used for nonce and action naming.
//!
//! A meta box is built either imperatively (`add_field`, `group_fields`) or
//! from a JSON definition. All shape rules are checked at configuration
//! time; renderers and persisters can assume a valid configuration.

use crate::field::{Field, FieldKind, DEFAULT_EDITOR_ROWS, DEFAULT_TEXTAREA_ROWS};
use serde_json::Value;
use thiserror::Error;

/// Capability required to save when none is configured.
pub const DEFAULT_CAPABILITY: &str = "edit_records";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("meta box id must not be empty")]
    EmptyId,
    #[error("meta box id '{0}' contains characters not allowed in input names")]
    InvalidId(String),
    #[error("field name must not be empty")]
    EmptyFieldName,
    #[error("name '{0}' contains characters not allowed in input names")]
    InvalidName(String),
    #[error("duplicate field name '{0}'")]
    DuplicateField(String),
    #[error("unknown field type '{0}'")]
    UnknownKind(String),
    #[error("option '{option}' is not valid for field '{field}'")]
    InvalidOption { field: String, option: String },
    #[error("definition entry for '{0}' must be a JSON object")]
    NotAnObject(&'static str),
    #[error("definition missing '{0}'")]
    MissingKey(&'static str),
}

/// An ordered set of fields sharing a storage-key prefix.
///
/// Declaration order is significant: it drives column order in the
/// row transpose and the first/last styling classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub prefix: String,
    pub fields: Vec<Field>,
}

impl Group {
    /// Storage key for one of the group's fields: prefix + short name,
    /// with no separator added by the crate.
    pub fn storage_key(&self, field: &Field) -> String {
        format!("{}{}", self.prefix, field.name)
    }
}

#[derive(Debug, Clone)]
pub struct MetaBox {
    pub id: String,
    pub title: String,
    capability: String,
    enables: Vec<String>,
    fields: Vec<Field>,
    groups: Vec<Group>,
}

impl MetaBox {
    pub fn new(title: impl Into<String>, id: impl Into<String>) -> Result<Self, DefinitionError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DefinitionError::EmptyId);
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DefinitionError::InvalidId(id));
        }
        Ok(Self {
            id,
            title: title.into(),
            capability: DEFAULT_CAPABILITY.to_string(),
            enables: Vec::new(),
            fields: Vec::new(),
            groups: Vec::new(),
        })
    }

    /// Key of the hidden input carrying the anti-forgery nonce.
    pub fn nonce_key(&self) -> String {
        format!("{}_nonce", self.id)
    }

    /// Action the nonce is issued and verified for.
    pub fn action_key(&self) -> String {
        format!("save-{}", self.id)
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn set_capability(&mut self, capability: impl Into<String>) {
        self.capability = capability.into();
    }

    /// Restricts the meta box to the given record kinds, ids, or slugs.
    /// An empty list (the default) enables it everywhere.
    pub fn set_enables<I, S>(&mut self, enables: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enables = enables.into_iter().map(Into::into).collect();
    }

    pub fn is_enabled_for(&self, kind: &str, id: &str, slug: &str) -> bool {
        if self.enables.is_empty() {
            return true;
        }
        self.enables
            .iter()
            .any(|e| e == kind || e == id || e == slug)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Adds a flat field. Names must be unique among flat fields.
    pub fn add_field(&mut self, field: Field) -> Result<(), DefinitionError> {
        validate_name(&field.name)?;
        if self.fields.iter().any(|f| f.name == field.name) {
            return Err(DefinitionError::DuplicateField(field.name));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Adds fields to the group with the given prefix, creating the group
    /// if needed. Field names must be unique within their group.
    pub fn group_fields<I>(&mut self, prefix: &str, fields: I) -> Result<(), DefinitionError>
    where
        I: IntoIterator<Item = Field>,
    {
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DefinitionError::InvalidName(prefix.to_string()));
        }
        let position = self.groups.iter().position(|g| g.prefix == prefix);
        let group = match position {
            Some(index) => &mut self.groups[index],
            None => {
                self.groups.push(Group {
                    prefix: prefix.to_string(),
                    fields: Vec::new(),
                });
                self.groups.last_mut().expect("group was just pushed")
            }
        };
        for field in fields {
            validate_name(&field.name)?;
            if group.fields.iter().any(|f| f.name == field.name) {
                return Err(DefinitionError::DuplicateField(field.name));
            }
            group.fields.push(field);
        }
        Ok(())
    }

    /// Builds a meta box from a JSON definition:
    ///
    /// ```json
    /// {
    ///   "id": "event_details",
    ///   "title": "Event details",
    ///   "capability": "edit_records",
    ///   "enables": ["post", "page"],
    ///   "fields": [ {"type": "text", "name": "subtitle"} ],
    ///   "groups": [ {"prefix": "address_", "fields": [ ... ]} ]
    /// }
    /// ```
    ///
    /// Unknown field types, empty or duplicate names, and options that do
    /// not apply to a field's kind are rejected here rather than falling
    /// back to defaults at render time.
    pub fn from_definition(definition: &Value) -> Result<Self, DefinitionError> {
        let obj = definition
            .as_object()
            .ok_or(DefinitionError::NotAnObject("definition"))?;
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .ok_or(DefinitionError::MissingKey("id"))?;
        let title = obj
            .get("title")
            .and_then(Value::as_str)
            .ok_or(DefinitionError::MissingKey("title"))?;

        let mut metabox = Self::new(title, id)?;
        if let Some(capability) = obj.get("capability").and_then(Value::as_str) {
            metabox.set_capability(capability);
        }
        if let Some(enables) = obj.get("enables").and_then(Value::as_array) {
            metabox.set_enables(enables.iter().filter_map(Value::as_str).map(String::from));
        }

        if let Some(fields) = obj.get("fields").and_then(Value::as_array) {
            for entry in fields {
                metabox.add_field(parse_field(entry)?)?;
            }
        }
        if let Some(groups) = obj.get("groups").and_then(Value::as_array) {
            for entry in groups {
                let group = entry
                    .as_object()
                    .ok_or(DefinitionError::NotAnObject("groups"))?;
                let prefix = group
                    .get("prefix")
                    .and_then(Value::as_str)
                    .ok_or(DefinitionError::MissingKey("prefix"))?;
                let fields = group
                    .get("fields")
                    .and_then(Value::as_array)
                    .ok_or(DefinitionError::MissingKey("fields"))?;
                let parsed = fields
                    .iter()
                    .map(parse_field)
                    .collect::<Result<Vec<_>, _>>()?;
                metabox.group_fields(prefix, parsed)?;
            }
        }

        Ok(metabox)
    }
}

fn validate_name(name: &str) -> Result<(), DefinitionError> {
    if name.is_empty() {
        return Err(DefinitionError::EmptyFieldName);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DefinitionError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn parse_field(entry: &Value) -> Result<Field, DefinitionError> {
    let obj = entry
        .as_object()
        .ok_or(DefinitionError::NotAnObject("fields"))?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or(DefinitionError::MissingKey("name"))?;
    let kind_name = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DefinitionError::MissingKey("type"))?;

    let rows = obj.get("rows").and_then(Value::as_u64).map(|r| r as u8);
    let kind = match kind_name {
        "text" => FieldKind::Text,
        "number" => FieldKind::Number,
        "url" => FieldKind::Url,
        "date" => FieldKind::Date,
        "textarea" => FieldKind::Textarea {
            rows: rows.unwrap_or(DEFAULT_TEXTAREA_ROWS),
        },
        "editor" => FieldKind::Editor {
            rows: rows.unwrap_or(DEFAULT_EDITOR_ROWS),
        },
        other => return Err(DefinitionError::UnknownKind(other.to_string())),
    };

    let takes_rows = matches!(kind, FieldKind::Textarea { .. } | FieldKind::Editor { .. });
    for option in obj.keys() {
        let allowed = matches!(option.as_str(), "type" | "name" | "placeholder")
            || (option == "rows" && takes_rows);
        if !allowed {
            return Err(DefinitionError::InvalidOption {
                field: name.to_string(),
                option: option.clone(),
            });
        }
    }

    let mut field = Field {
        name: name.to_string(),
        kind,
        placeholder: None,
    };
    if let Some(placeholder) = obj.get("placeholder").and_then(Value::as_str) {
        field = field.placeholder(placeholder);
    }
    Ok(field)
}
