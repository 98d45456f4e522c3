//! Per-type text serialization
//!
//! A [`Serializer`] turns one element into a text form and back. The type
//! registry pairs that text form with the type's code name.

use crate::tag::TypeTag;
use crate::value::{Element, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

/// Text codec for elements of one semantic type
pub trait Serializer: Send + Sync {
    /// Encode `value`
    ///
    /// # Errors
    /// Returns error if `value` is not of the serializer's type or cannot be encoded
    fn serialize(&self, value: &Value) -> Result<String, SerializeError>;

    /// Decode a text form produced by [`Serializer::serialize`]
    ///
    /// # Errors
    /// Returns error if `text` is malformed
    fn deserialize(&self, text: &str) -> Result<Value, SerializeError>;
}

/// Errors raised by serializers
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// Value of another type was handed to the serializer
    #[error("expected value of type {expected}, got {actual}")]
    WrongType { expected: TypeTag, actual: TypeTag },

    /// Text form could not be decoded
    #[error("malformed data: {0}")]
    Malformed(String),

    /// JSON encoding failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn expect_type<T: Element>(value: &Value) -> Result<&T, SerializeError> {
    value.downcast_ref::<T>().ok_or(SerializeError::WrongType {
        expected: TypeTag::of::<T>(),
        actual: value.tag(),
    })
}

/// Serializer built from a pair of functions
///
/// ```rust
/// use lit_types::{FnSerializer, Serializer, Value};
///
/// let ser = FnSerializer::new(|v: &i64| v.to_string(), |s| s.parse::<i64>().ok());
/// assert_eq!(ser.serialize(&Value::new(12i64)).unwrap(), "12");
/// ```
pub struct FnSerializer<T> {
    encode: fn(&T) -> String,
    decode: fn(&str) -> Option<T>,
}

impl<T: Element> FnSerializer<T> {
    /// Create from encode/decode functions
    #[inline]
    #[must_use]
    pub fn new(encode: fn(&T) -> String, decode: fn(&str) -> Option<T>) -> Self {
        Self { encode, decode }
    }
}

impl<T> Debug for FnSerializer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSerializer")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Element> Serializer for FnSerializer<T> {
    fn serialize(&self, value: &Value) -> Result<String, SerializeError> {
        expect_type::<T>(value).map(self.encode)
    }

    fn deserialize(&self, text: &str) -> Result<Value, SerializeError> {
        (self.decode)(text)
            .map(Value::new)
            .ok_or_else(|| SerializeError::Malformed(format!("cannot decode '{text}'")))
    }
}

/// Serializer for any serde type, using JSON text forms
pub struct SerdeSerializer<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> SerdeSerializer<T> {
    /// Create serializer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for SerdeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for SerdeSerializer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdeSerializer")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Serializer for SerdeSerializer<T>
where
    T: Element + Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &Value) -> Result<String, SerializeError> {
        let element = expect_type::<T>(value)?;
        Ok(serde_json::to_string(element)?)
    }

    fn deserialize(&self, text: &str) -> Result<Value, SerializeError> {
        let element: T = serde_json::from_str(text)?;
        Ok(Value::new(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn fn_serializer_encodes() {
        let ser = FnSerializer::new(|v: &i64| v.to_string(), |s| s.parse::<i64>().ok());
        assert_eq!(ser.serialize(&Value::new(-4i64)).unwrap(), "-4");
        let back = ser.deserialize("17").unwrap();
        assert_eq!(back.downcast_ref::<i64>(), Some(&17));
    }

    #[test]
    fn fn_serializer_rejects_malformed() {
        let ser = FnSerializer::new(|v: &i64| v.to_string(), |s| s.parse::<i64>().ok());
        assert!(matches!(ser.deserialize("x1"), Err(SerializeError::Malformed(_))));
    }

    #[test]
    fn fn_serializer_rejects_other_types() {
        let ser = FnSerializer::new(|v: &i64| v.to_string(), |s| s.parse::<i64>().ok());
        let result = ser.serialize(&Value::new("nope".to_string()));
        assert!(matches!(result, Err(SerializeError::WrongType { .. })));
    }

    #[test]
    fn serde_serializer_uses_json() {
        let ser = SerdeSerializer::<Point>::new();
        let text = ser.serialize(&Value::new(Point { x: 1, y: 2 })).unwrap();
        assert_eq!(text, r#"{"x":1,"y":2}"#);

        let back = ser.deserialize(&text).unwrap();
        assert_eq!(back.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
    }

    #[test]
    fn serde_serializer_reports_json_errors() {
        let ser = SerdeSerializer::<Point>::new();
        assert!(matches!(ser.deserialize("{"), Err(SerializeError::Json(_))));
    }
}
