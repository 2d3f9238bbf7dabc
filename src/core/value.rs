//! Appending dynamically typed values.
//!
//! Values arriving from JSON documents or other untyped input are checked
//! here before they reach [`ByteArray::append`]. Strings are appended as
//! text, arrays of integers in `0..=255` as raw bytes; anything else is
//! rejected with [`BufferError::UnsupportedSourceType`].

use crate::core::bytearray::{AppendSource, ByteArray};
use crate::error::{BufferError, Result};
use serde_json::Value;

/// Name used in errors for a rejected JSON value.
const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collects a JSON array into bytes, or `None` if any element is not an
/// integer in `0..=255`.
fn byte_array(items: &[Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

impl ByteArray {
    /// Appends a JSON value.
    ///
    /// The array is left unchanged when the value is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::UnsupportedSourceType`] for values that are
    /// neither strings nor byte arrays, and [`BufferError::Invalidated`] if
    /// the array was frozen or disposed.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytearray_rs::ByteArray;
    /// use serde_json::json;
    ///
    /// let mut array = ByteArray::new();
    /// array.append_value(&json!("hi"))?.append_value(&json!([33]))?;
    /// assert_eq!(array.to_text()?, "hi!");
    /// assert!(array.append_value(&json!(42)).is_err());
    /// # Ok::<(), bytearray_rs::Error>(())
    /// ```
    pub fn append_value(&mut self, value: &Value) -> Result<&mut Self> {
        // Retired arrays report that before any type complaint.
        self.len()?;
        match value {
            Value::String(text) => self.append(AppendSource::Text(text)),
            Value::Array(items) => match byte_array(items) {
                Some(bytes) => self.append(&bytes),
                None => Err(BufferError::UnsupportedSourceType {
                    type_name: "array",
                }
                .into()),
            },
            other => Err(BufferError::UnsupportedSourceType {
                type_name: type_name(other),
            }
            .into()),
        }
    }

    /// Builds a byte array from a sequence of JSON values.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::UnsupportedSourceType`] on the first value
    /// that cannot be appended.
    pub fn from_values<'a, I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut array = Self::new();
        for value in values {
            array.append_value(value)?;
        }
        Ok(array)
    }
}
