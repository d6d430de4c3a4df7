use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXTAREA_ROWS: u8 = 10;
pub const DEFAULT_EDITOR_ROWS: u8 = 10;

/// Format used for stored date values.
pub const DATE_STORAGE_FORMAT: &str = "%Y-%m-%d";
/// Format shown to the user while editing.
pub const DATE_DISPLAY_FORMAT: &str = "%d-%m-%Y";

/// Kind of a custom field, carrying only the options valid for that kind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Url,
    Date,
    Textarea { rows: u8 },
    Editor { rows: u8 },
}

impl FieldKind {
    /// Value of the `type` attribute when the field renders as an `<input>`.
    /// Textarea and editor fields render as `<textarea>` instead.
    pub fn input_type(&self) -> Option<&'static str> {
        match self {
            FieldKind::Text => Some("text"),
            FieldKind::Number => Some("number"),
            FieldKind::Url => Some("url"),
            FieldKind::Date => Some("date"),
            FieldKind::Textarea { .. } | FieldKind::Editor { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Url => "url",
            FieldKind::Date => "date",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Editor { .. } => "editor",
        }
    }
}

/// An immutable custom-field descriptor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Field {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            placeholder: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Number)
    }

    pub fn url(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Url)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Date)
    }

    pub fn textarea(name: impl Into<String>, rows: u8) -> Self {
        Self::with_kind(name, FieldKind::Textarea { rows })
    }

    pub fn editor(name: impl Into<String>, rows: u8) -> Self {
        Self::with_kind(name, FieldKind::Editor { rows })
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Maps a stored value to its edit-time representation.
    ///
    /// Date fields are stored as `YYYY-MM-DD` and shown as `DD-MM-YYYY`.
    /// Saving does not convert back; the submitted text is stored verbatim
    /// after sanitizing. Unparseable dates pass through unchanged.
    pub fn display_value(&self, stored: &str) -> String {
        if self.kind == FieldKind::Date {
            if let Ok(date) = NaiveDate::parse_from_str(stored, DATE_STORAGE_FORMAT) {
                return date.format(DATE_DISPLAY_FORMAT).to_string();
            }
        }
        stored.to_string()
    }
}
