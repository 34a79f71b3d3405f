//! JSON-safe serialization of extracted values.
//!
//! Everything written by gaussparse goes through this module so that all
//! outputs share one text layout: UTF-8 with non-ASCII characters kept as-is,
//! two-space indentation and a trailing newline.
//!
//! - [`Value`] - dynamic values reported by parsers (metadata)
//! - [`ToNested`] - array-like values that flatten to nested lists
//! - [`to_pretty_string`] - serialization entry point

mod value;

pub use value::{ToNested, Value};

use serde::Serialize;

/// Render a value as indented JSON text.
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}
