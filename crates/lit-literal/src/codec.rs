//! Persistence codec
//!
//! Turns a literal into a [`SerializedLiteral`] of `(type id, text)` pairs
//! and back, through the serializers registered on the type registry.
//! Either every element makes it or the whole operation fails.
//!
//! ```rust,ignore
//! let saved = codec::serialize(&*literal)?;
//! let text = codec::to_text(&saved)?;
//! let restored = codec::deserialize(&registry, &codec::from_text(&text)?)?;
//! ```

use crate::error::LiteralError;
use crate::expression::{Literal, Quantifier};
use crate::simple::SimpleLiteral;
use lit_types::{Registry, RegistryError, TypeTag, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Code name stored for literals of the top type
pub const OBJECT_CODE_NAME: &str = "object";

/// Errors related to saving and restoring literals
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An element (or the element type) has no serialized form
    #[error("literal of type '{type_name}' cannot be saved: {source}")]
    Unserializable {
        type_name: String,
        source: RegistryError,
    },

    /// Saved data cannot be turned back into a literal
    #[error("corrupt literal of type '{type_name}'{}: {reason}", at_index(.index))]
    Corrupt {
        type_name: String,
        index: Option<usize>,
        reason: String,
    },

    /// Text form is not valid JSON for a saved literal
    #[error("invalid saved literal text: {0}")]
    Format(#[from] serde_json::Error),

    /// Restored elements do not form a valid literal
    #[error("restored literal is invalid: {0}")]
    Literal(#[from] LiteralError),
}

fn at_index(index: &Option<usize>) -> String {
    index.map(|i| format!(" at element {i}")).unwrap_or_default()
}

/// Saved form of one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedElement {
    /// Code name of the element's concrete type
    pub type_id: String,
    /// Text produced by that type's serializer
    pub data: String,
}

/// Saved form of a literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedLiteral {
    /// Code name of the literal's element type
    pub element_type: String,
    pub quantifier: Quantifier,
    #[serde(default)]
    pub is_default: bool,
    pub elements: Vec<SerializedElement>,
}

/// Save every element of `literal`
///
/// # Errors
/// Returns [`CodecError::Unserializable`] if the element type is unknown to
/// the registry or any element has no serializer
pub fn serialize(literal: &dyn Literal) -> Result<SerializedLiteral, CodecError> {
    let registry = literal.registry();
    let element_type = literal.element_type();
    let type_name = registry.types().user_name(element_type);

    let unserializable = |source: RegistryError| {
        warn!(element_type = %element_type, error = %source, "literal cannot be saved");
        CodecError::Unserializable {
            type_name: type_name.clone(),
            source,
        }
    };

    let element_code = element_code_name(registry, element_type).map_err(unserializable)?;
    let elements = literal
        .all_values()
        .iter()
        .map(|value| {
            registry
                .serialize(value)
                .map(|(type_id, data)| SerializedElement { type_id, data })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(unserializable)?;

    Ok(SerializedLiteral {
        element_type: element_code,
        quantifier: literal.quantifier(),
        is_default: literal.is_default(),
        elements,
    })
}

/// Restore a literal saved by [`serialize`]
///
/// # Errors
/// Returns [`CodecError::Corrupt`] if the element type or an element's
/// type id is unknown, an element's text cannot be decoded, a decoded
/// element does not fit the element type, or there are no elements
pub fn deserialize(
    registry: &Arc<Registry>,
    saved: &SerializedLiteral,
) -> Result<SimpleLiteral, CodecError> {
    let corrupt = |index: Option<usize>, reason: String| {
        warn!(element_type = %saved.element_type, ?index, %reason, "corrupt saved literal");
        CodecError::Corrupt {
            type_name: saved.element_type.clone(),
            index,
            reason,
        }
    };

    let element_type = resolve_element_type(registry, &saved.element_type)
        .ok_or_else(|| corrupt(None, "unknown element type".to_string()))?;
    if saved.elements.is_empty() {
        return Err(corrupt(None, "no elements".to_string()));
    }

    let mut values: Vec<Value> = Vec::with_capacity(saved.elements.len());
    for (index, element) in saved.elements.iter().enumerate() {
        let value = registry
            .deserialize(&element.type_id, &element.data)
            .map_err(|e| corrupt(Some(index), e.to_string()))?;
        if !registry.is_assignable(value.tag(), element_type) {
            return Err(corrupt(
                Some(index),
                format!("element of type {} does not fit", value.tag()),
            ));
        }
        values.push(value);
    }

    let literal = SimpleLiteral::new(Arc::clone(registry), values, element_type, saved.quantifier)?
        .with_default(saved.is_default);
    Ok(literal)
}

/// Encode a saved literal as JSON text
///
/// # Errors
/// Returns error if JSON encoding fails
pub fn to_text(saved: &SerializedLiteral) -> Result<String, CodecError> {
    Ok(serde_json::to_string(saved)?)
}

/// Decode a saved literal from JSON text
///
/// # Errors
/// Returns error if `text` is not a saved literal
pub fn from_text(text: &str) -> Result<SerializedLiteral, CodecError> {
    Ok(serde_json::from_str(text)?)
}

fn element_code_name(registry: &Registry, tag: TypeTag) -> Result<String, RegistryError> {
    match registry.types().info(tag) {
        Some(info) => Ok(info.code_name().to_string()),
        None if tag.is_object() => Ok(OBJECT_CODE_NAME.to_string()),
        None => Err(RegistryError::UnknownType(tag)),
    }
}

fn resolve_element_type(registry: &Registry, code_name: &str) -> Option<TypeTag> {
    match registry.types().info_by_code_name(code_name) {
        Some(info) => Some(info.tag()),
        None if code_name == OBJECT_CODE_NAME => Some(TypeTag::object()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_types::{FnSerializer, SerdeSerializer, TypeInfo};
    use pretty_assertions::assert_eq;

    fn registry() -> Arc<Registry> {
        Registry::builder()
            .register_type(
                TypeInfo::new::<i64>("integer")
                    .with_serializer(FnSerializer::new(
                        |v: &i64| v.to_string(),
                        |s| s.parse().ok(),
                    )),
            )
            .register_type(
                TypeInfo::new::<String>("text").with_serializer(SerdeSerializer::<String>::new()),
            )
            .register_type(TypeInfo::new::<u8>("byte"))
            .build_shared()
            .unwrap()
    }

    fn ints(values: &[i64], quantifier: Quantifier) -> SimpleLiteral {
        SimpleLiteral::of(registry(), values.iter().copied(), quantifier).unwrap()
    }

    #[test]
    fn saves_type_quantifier_and_elements() {
        let saved = serialize(&ints(&[3, 5], Quantifier::Or)).unwrap();
        assert_eq!(
            saved,
            SerializedLiteral {
                element_type: "integer".to_string(),
                quantifier: Quantifier::Or,
                is_default: false,
                elements: vec![
                    SerializedElement { type_id: "integer".to_string(), data: "3".to_string() },
                    SerializedElement { type_id: "integer".to_string(), data: "5".to_string() },
                ],
            }
        );
    }

    #[test]
    fn round_trip_preserves_elements() {
        let registry = registry();
        let original = ints(&[3, 5, 8], Quantifier::Or).with_default(true);
        let restored = deserialize(&registry, &serialize(&original).unwrap()).unwrap();

        assert_eq!(restored.element_type(), original.element_type());
        assert_eq!(restored.quantifier(), Quantifier::Or);
        assert!(restored.is_default());
        let values: Vec<i64> = restored
            .all_values()
            .iter()
            .filter_map(|v| v.downcast_ref::<i64>().copied())
            .collect();
        assert_eq!(values, vec![3, 5, 8]);
    }

    #[test]
    fn mixed_object_literal_round_trips() {
        let registry = registry();
        let values = vec![Value::new(1i64), Value::new("one".to_string())];
        let original = SimpleLiteral::new(
            Arc::clone(&registry),
            values,
            TypeTag::object(),
            Quantifier::And,
        )
        .unwrap();

        let saved = serialize(&original).unwrap();
        assert_eq!(saved.element_type, OBJECT_CODE_NAME);
        let restored = deserialize(&registry, &saved).unwrap();
        assert_eq!(restored.to_string(), original.to_string());
    }

    #[test]
    fn element_without_serializer_fails_save() {
        let literal = SimpleLiteral::of(registry(), [1u8, 2], Quantifier::And).unwrap();
        let err = serialize(&literal).unwrap_err();
        assert!(matches!(err, CodecError::Unserializable { .. }));
    }

    #[test]
    fn corrupt_element_fails_restore() {
        let mut saved = serialize(&ints(&[3, 5], Quantifier::And)).unwrap();
        saved.elements[1].data = "five".to_string();

        let err = deserialize(&registry(), &saved).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt { index: Some(1), .. }));
        assert_eq!(
            err.to_string(),
            "corrupt literal of type 'integer' at element 1: serializer failed: malformed data: cannot decode 'five'"
        );
    }

    #[test]
    fn mismatched_element_fails_restore() {
        let mut saved = serialize(&ints(&[3, 5], Quantifier::And)).unwrap();
        saved.elements[0] = SerializedElement {
            type_id: "text".to_string(),
            data: "\"three\"".to_string(),
        };
        let err = deserialize(&registry(), &saved).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt { index: Some(0), .. }));
    }

    #[test]
    fn unknown_element_type_fails_restore() {
        let mut saved = serialize(&ints(&[3], Quantifier::And)).unwrap();
        saved.element_type = "vector".to_string();
        let err = deserialize(&registry(), &saved).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt { index: None, .. }));
    }

    #[test]
    fn empty_saved_literal_fails_restore() {
        let mut saved = serialize(&ints(&[3], Quantifier::And)).unwrap();
        saved.elements.clear();
        assert!(matches!(
            deserialize(&registry(), &saved),
            Err(CodecError::Corrupt { index: None, .. })
        ));
    }

    #[test]
    fn text_form_round_trip() {
        let saved = serialize(&ints(&[3, 5], Quantifier::Or)).unwrap();
        let text = to_text(&saved).unwrap();
        assert!(text.contains("\"quantifier\":\"or\""));
        assert_eq!(from_text(&text).unwrap(), saved);
        assert!(matches!(from_text("{"), Err(CodecError::Format(_))));
    }

    #[test]
    fn default_flag_is_optional_in_text() {
        let text = r#"{"element_type":"integer","quantifier":"and","elements":[{"type_id":"integer","data":"4"}]}"#;
        let saved = from_text(text).unwrap();
        assert!(!saved.is_default);
        assert_eq!(deserialize(&registry(), &saved).unwrap().len(), 1);
    }
}
