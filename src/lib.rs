#![warn(warnings)]
#![deny(clippy::all)]

pub mod field;
pub mod html;
pub mod metabox;
pub mod multiple;
pub mod repeat;
pub mod rows;
pub mod sanitize;
pub mod security;
pub mod simple;
pub mod storage;

pub use field::{Field, FieldKind};
pub use metabox::{Group, MetaBox};
pub use rows::{to_columns, to_rows, Columns, Row};
pub use sanitize::Sanitizer;
pub use security::SecurityProvider;
pub use storage::MetaValue;
