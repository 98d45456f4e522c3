//! Combined registry
//!
//! Provides [`Registry`], the type and converter tables every literal
//! consults, built once with [`RegistryBuilder`] and shared through `Arc`.

use crate::changer::Changer;
use crate::converter::{apply_policy, ConversionPolicy, Converter, ConverterRegistry};
use crate::serializer::SerializeError;
use crate::tag::TypeTag;
use crate::types::{StringMode, TypeInfo, TypeRegistry};
use crate::value::Value;
use std::sync::Arc;
use tracing::trace;

/// Errors related to registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Type registered twice
    #[error("type already registered: {0}")]
    DuplicateType(TypeTag),

    /// Code name registered twice
    #[error("code name already registered: {0}")]
    DuplicateCodeName(String),

    /// Value of a type the registry does not know
    #[error("unknown type: {0}")]
    UnknownType(TypeTag),

    /// Code name the registry does not know
    #[error("unknown type code name: {0}")]
    UnknownCodeName(String),

    /// Type registered without a serializer
    #[error("type '{0}' cannot be serialized")]
    NotSerializable(String),

    /// Serializer failure
    #[error("serializer failed: {0}")]
    Serialize(#[from] SerializeError),
}

/// Type and converter tables
///
/// Immutable once built; share it through `Arc`. The only interior state
/// is the converter lookup cache, which tolerates concurrent fills.
#[derive(Debug, Default)]
pub struct Registry {
    types: TypeRegistry,
    converters: ConverterRegistry,
}

impl Registry {
    /// Start building a registry
    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Create from prepared tables
    #[inline]
    #[must_use]
    pub fn from_parts(types: TypeRegistry, converters: ConverterRegistry) -> Self {
        Self { types, converters }
    }

    #[inline]
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[inline]
    #[must_use]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// See [`TypeRegistry::is_assignable`]
    #[inline]
    #[must_use]
    pub fn is_assignable(&self, from: TypeTag, to: TypeTag) -> bool {
        self.types.is_assignable(from, to)
    }

    /// Find a converter from `from` to `to`
    ///
    /// # Lookup order
    /// 1. Converter registered for exactly `(from, to)`
    /// 2. First converter whose source is `from` or one of its ancestors
    ///    and whose target is assignable to `to`
    /// 3. Converter registered from the top type, which every type
    ///    is assignable to
    ///
    /// Answers, including misses, are memoized per pair.
    #[must_use]
    pub fn converter(&self, from: TypeTag, to: TypeTag) -> Option<Converter> {
        let key = (from, to);
        if let Some(hit) = self.converters.cached(key) {
            trace!(
                from = %from,
                to = %to,
                found = hit.is_some(),
                "converter lookup served from cache"
            );
            return hit;
        }

        let found = self.converters.exact(from, to).cloned().or_else(|| {
            let mut ancestry = self.types.ancestry(from);
            if !ancestry.contains(&TypeTag::object()) {
                ancestry.push(TypeTag::object());
            }
            ancestry.iter().find_map(|source| {
                self.converters
                    .iter()
                    .find(|c| c.from() == *source && self.types.is_assignable(c.to(), to))
                    .cloned()
            })
        });

        self.converters.remember(key, found.clone());
        found
    }

    /// Convert `values` to `to` with `converter`
    ///
    /// Outputs whose type is not assignable to `to` count as declined.
    #[must_use]
    pub fn convert_values(
        &self,
        values: &[Value],
        converter: &Converter,
        to: TypeTag,
        policy: ConversionPolicy,
    ) -> Option<Vec<Value>> {
        apply_policy(
            values,
            |v| {
                converter
                    .convert(v)
                    .filter(|out| self.types.is_assignable(out.tag(), to))
            },
            policy,
        )
    }

    /// See [`TypeRegistry::render`]
    #[inline]
    #[must_use]
    pub fn render(&self, value: &Value, mode: StringMode) -> String {
        self.types.render(value, mode)
    }

    /// See [`TypeRegistry::render_list`]
    #[inline]
    #[must_use]
    pub fn render_list(&self, values: &[Value], and: bool, mode: StringMode) -> String {
        self.types.render_list(values, and, mode)
    }

    /// See [`TypeRegistry::serialize`]
    ///
    /// # Errors
    /// Returns error if the value cannot be serialized
    #[inline]
    pub fn serialize(&self, value: &Value) -> Result<(String, String), RegistryError> {
        self.types.serialize(value)
    }

    /// See [`TypeRegistry::deserialize`]
    ///
    /// # Errors
    /// Returns error if the data cannot be deserialized
    #[inline]
    pub fn deserialize(&self, code_name: &str, text: &str) -> Result<Value, RegistryError> {
        self.types.deserialize(code_name, text)
    }

    /// See [`TypeRegistry::changer_for`]
    #[inline]
    #[must_use]
    pub fn changer_for(&self, tag: TypeTag) -> Option<Arc<dyn Changer>> {
        self.types.changer_for(tag)
    }
}

/// Builder for [`Registry`]
///
/// Registration errors are deferred to [`RegistryBuilder::build`] so the
/// builder can be chained.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: TypeRegistry,
    converters: ConverterRegistry,
    error: Option<RegistryError>,
}

impl RegistryBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type
    #[must_use]
    pub fn register_type(mut self, info: TypeInfo) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.types.register(info) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Register a converter
    #[inline]
    #[must_use]
    pub fn register_converter(mut self, converter: Converter) -> Self {
        self.converters.register(converter);
        self
    }

    /// Build registry
    ///
    /// # Errors
    /// Returns the first registration error
    pub fn build(self) -> Result<Registry, RegistryError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Registry::from_parts(self.types, self.converters)),
        }
    }

    /// Build registry behind `Arc`
    ///
    /// # Errors
    /// Returns the first registration error
    pub fn build_shared(self) -> Result<Arc<Registry>, RegistryError> {
        self.build().map(Arc::new)
    }
}
