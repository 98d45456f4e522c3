//! Type registry
//!
//! Provides [`TypeInfo`], the capability set of one semantic type, and
//! [`TypeRegistry`], the lookup table keyed by [`TypeTag`].

use crate::changer::Changer;
use crate::registry::RegistryError;
use crate::serializer::Serializer;
use crate::tag::TypeTag;
use crate::value::{Element, Value};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// How a value is rendered to text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StringMode {
    /// Text shown to users
    #[default]
    Message,
    /// Text for debug output
    Debug,
    /// Text used inside variable names
    VariableName,
}

/// Type-erased renderer
///
/// Returns `None` if the value is not of the renderer's type.
pub type Renderer = Arc<dyn Fn(&Value, StringMode) -> Option<String> + Send + Sync>;

/// Capabilities registered for one semantic type
///
/// # Example
/// ```rust
/// use lit_types::{FnSerializer, TypeInfo, TypeTag};
///
/// struct Number;
///
/// let info = TypeInfo::new::<i64>("integer")
///     .with_user_name("integer")
///     .with_supertype(TypeTag::of::<Number>())
///     .with_renderer(|v: &i64, _| v.to_string())
///     .with_serializer(FnSerializer::new(|v: &i64| v.to_string(), |s| s.parse().ok()));
///
/// assert_eq!(info.code_name(), "integer");
/// assert!(info.serializer().is_some());
/// ```
pub struct TypeInfo {
    tag: TypeTag,
    code_name: String,
    user_name: String,
    supertypes: Vec<TypeTag>,
    renderer: Option<Renderer>,
    serializer: Option<Arc<dyn Serializer>>,
    changer: Option<Arc<dyn Changer>>,
}

impl TypeInfo {
    /// Create info for type `T` with a stable code name
    ///
    /// The code name identifies the type in persisted data and must never
    /// change once data has been written.
    #[must_use]
    pub fn new<T: ?Sized + 'static>(code_name: impl Into<String>) -> Self {
        let code_name = code_name.into();
        Self {
            tag: TypeTag::of::<T>(),
            user_name: code_name.clone(),
            code_name,
            supertypes: Vec::new(),
            renderer: None,
            serializer: None,
            changer: None,
        }
    }

    /// Set the name shown to users
    #[inline]
    #[must_use]
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = name.into();
        self
    }

    /// Declare a semantic supertype
    #[inline]
    #[must_use]
    pub fn with_supertype(mut self, supertype: TypeTag) -> Self {
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

    /// Set a typed renderer
    #[must_use]
    pub fn with_renderer<T, F>(mut self, render: F) -> Self
    where
        T: Element,
        F: Fn(&T, StringMode) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(move |value: &Value, mode| {
            value.downcast_ref::<T>().map(|v| render(v, mode))
        }));
        self
    }

    /// Set a type-erased renderer
    #[inline]
    #[must_use]
    pub fn with_dyn_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set the serializer
    #[inline]
    #[must_use]
    pub fn with_serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Set the changer
    #[inline]
    #[must_use]
    pub fn with_changer(mut self, changer: impl Changer + 'static) -> Self {
        self.changer = Some(Arc::new(changer));
        self
    }

    /// Set a shared changer
    #[inline]
    #[must_use]
    pub fn with_shared_changer(mut self, changer: Arc<dyn Changer>) -> Self {
        self.changer = Some(changer);
        self
    }

    #[inline]
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    #[inline]
    #[must_use]
    pub fn code_name(&self) -> &str {
        &self.code_name
    }

    #[inline]
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    #[inline]
    #[must_use]
    pub fn supertypes(&self) -> &[TypeTag] {
        &self.supertypes
    }

    #[inline]
    #[must_use]
    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn serializer(&self) -> Option<&Arc<dyn Serializer>> {
        self.serializer.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn changer(&self) -> Option<&Arc<dyn Changer>> {
        self.changer.as_ref()
    }
}

impl Debug for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("tag", &self.tag)
            .field("code_name", &self.code_name)
            .field("supertypes", &self.supertypes)
            .field("renderer", &self.renderer.is_some())
            .field("serializer", &self.serializer.is_some())
            .field("changer", &self.changer)
            .finish()
    }
}

/// Lookup table of semantic types
///
/// Keyed by [`TypeTag`], with a secondary index by code name for
/// persistence. Iteration follows registration order.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_tag: IndexMap<TypeTag, Arc<TypeInfo>>,
    by_code_name: HashMap<String, TypeTag>,
}

impl TypeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type
    ///
    /// # Errors
    /// Returns error if the tag or the code name is already registered
    pub fn register(&mut self, info: TypeInfo) -> Result<(), RegistryError> {
        if self.by_tag.contains_key(&info.tag) {
            return Err(RegistryError::DuplicateType(info.tag));
        }
        if self.by_code_name.contains_key(&info.code_name) {
            return Err(RegistryError::DuplicateCodeName(info.code_name));
        }
        self.by_code_name.insert(info.code_name.clone(), info.tag);
        self.by_tag.insert(info.tag, Arc::new(info));
        Ok(())
    }

    /// Info registered for exactly `tag`
    #[inline]
    #[must_use]
    pub fn info(&self, tag: TypeTag) -> Option<&Arc<TypeInfo>> {
        self.by_tag.get(&tag)
    }

    /// Info registered under a code name
    #[inline]
    #[must_use]
    pub fn info_by_code_name(&self, code_name: &str) -> Option<&Arc<TypeInfo>> {
        self.by_code_name
            .get(code_name)
            .and_then(|tag| self.by_tag.get(tag))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.by_tag.contains_key(&tag)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Iterate over registered types
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeInfo>> {
        self.by_tag.values()
    }

    /// `tag` followed by every declared ancestor, nearest first
    ///
    /// Ancestors are visited breadth-first; each appears once.
    #[must_use]
    pub fn ancestry(&self, tag: TypeTag) -> Vec<TypeTag> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([tag]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(info) = self.by_tag.get(&current) {
                queue.extend(info.supertypes.iter().copied());
            }
        }
        order
    }

    /// Check if values of `from` can be used where `to` is expected
    ///
    /// True for identical tags, declared (transitive) supertypes, and the
    /// object top type.
    #[must_use]
    pub fn is_assignable(&self, from: TypeTag, to: TypeTag) -> bool {
        if from == to || to.is_object() {
            return true;
        }
        self.ancestry(from).contains(&to)
    }

    /// Render one value
    ///
    /// Tries the renderers of the value's type and its ancestors, nearest
    /// first, then falls back to the element's `Debug` output.
    #[must_use]
    pub fn render(&self, value: &Value, mode: StringMode) -> String {
        self.ancestry(value.tag())
            .into_iter()
            .filter_map(|tag| self.by_tag.get(&tag))
            .filter_map(|info| info.renderer.as_ref())
            .find_map(|render| (**render)(value, mode))
            .unwrap_or_else(|| format!("{value:?}"))
    }

    /// Render values joined as a list
    ///
    /// `"a, b and c"` when `and` is set, `"a, b or c"` otherwise.
    #[must_use]
    pub fn render_list(&self, values: &[Value], and: bool, mode: StringMode) -> String {
        let parts: Vec<String> = values.iter().map(|v| self.render(v, mode)).collect();
        join_list(&parts, and)
    }

    /// Serialize one value to `(code name, text)`
    ///
    /// # Errors
    /// Returns error if the value's type is unregistered, has no
    /// serializer, or the serializer fails
    pub fn serialize(&self, value: &Value) -> Result<(String, String), RegistryError> {
        let info = self
            .info(value.tag())
            .ok_or(RegistryError::UnknownType(value.tag()))?;
        let serializer = info
            .serializer
            .as_ref()
            .ok_or_else(|| RegistryError::NotSerializable(info.code_name.clone()))?;
        let text = serializer.serialize(value)?;
        Ok((info.code_name.clone(), text))
    }

    /// Deserialize a value from its code name and text form
    ///
    /// # Errors
    /// Returns error if the code name is unknown, the type has no
    /// serializer, or the text is malformed
    pub fn deserialize(&self, code_name: &str, text: &str) -> Result<Value, RegistryError> {
        let info = self
            .info_by_code_name(code_name)
            .ok_or_else(|| RegistryError::UnknownCodeName(code_name.to_string()))?;
        let serializer = info
            .serializer
            .as_ref()
            .ok_or_else(|| RegistryError::NotSerializable(info.code_name.clone()))?;
        Ok(serializer.deserialize(text)?)
    }

    /// Changer for values of `tag`
    ///
    /// Uses the nearest changer along the type's ancestry.
    #[must_use]
    pub fn changer_for(&self, tag: TypeTag) -> Option<Arc<dyn Changer>> {
        self.ancestry(tag)
            .into_iter()
            .filter_map(|t| self.by_tag.get(&t))
            .find_map(|info| info.changer.clone())
    }

    /// User-facing name of a type
    #[must_use]
    pub fn user_name(&self, tag: TypeTag) -> String {
        self.info(tag)
            .map_or_else(|| tag.short_name().to_string(), |i| i.user_name.clone())
    }
}

/// Join rendered parts as an English list
///
/// ```rust
/// use lit_types::join_list;
///
/// let parts = ["a", "b", "c"].map(String::from);
/// assert_eq!(join_list(&parts, true), "a, b and c");
/// assert_eq!(join_list(&parts, false), "a, b or c");
/// ```
#[must_use]
pub fn join_list(parts: &[String], and: bool) -> String {
    let conjunction = if and { " and " } else { " or " };
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => {
            let mut out = init.join(", ");
            out.push_str(conjunction);
            out.push_str(last);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changer::{ChangeError, ChangeMode};
    use crate::serializer::FnSerializer;
    use pretty_assertions::assert_eq;

    struct Number;

    #[derive(Debug)]
    struct NoopChanger;

    impl Changer for NoopChanger {
        fn accept_change(&self, _mode: ChangeMode) -> Option<Vec<TypeTag>> {
            Some(Vec::new())
        }

        fn change(
            &self,
            _elements: &mut [Value],
            _delta: &[Value],
            _mode: ChangeMode,
        ) -> Result<(), ChangeError> {
            Ok(())
        }
    }

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types
            .register(TypeInfo::new::<Number>("number").with_changer(NoopChanger))
            .unwrap();
        types
            .register(
                TypeInfo::new::<i64>("integer")
                    .with_supertype(TypeTag::of::<Number>())
                    .with_renderer(|v: &i64, mode| match mode {
                        StringMode::Debug => format!("int({v})"),
                        _ => v.to_string(),
                    })
                    .with_serializer(FnSerializer::new(
                        |v: &i64| v.to_string(),
                        |s| s.parse().ok(),
                    )),
            )
            .unwrap();
        types
            .register(TypeInfo::new::<String>("string").with_user_name("text"))
            .unwrap();
        types
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut types = registry();
        let dup_tag = types.register(TypeInfo::new::<i64>("other"));
        assert!(matches!(dup_tag, Err(RegistryError::DuplicateType(_))));

        let dup_name = types.register(TypeInfo::new::<u8>("integer"));
        assert!(matches!(dup_name, Err(RegistryError::DuplicateCodeName(_))));
    }

    #[test]
    fn assignability_follows_supertypes() {
        let types = registry();
        let int = TypeTag::of::<i64>();
        let number = TypeTag::of::<Number>();

        assert!(types.is_assignable(int, int));
        assert!(types.is_assignable(int, number));
        assert!(!types.is_assignable(number, int));
        assert!(types.is_assignable(TypeTag::of::<String>(), TypeTag::object()));
        assert!(!types.is_assignable(TypeTag::of::<String>(), number));
    }

    #[test]
    fn ancestry_is_nearest_first() {
        let types = registry();
        let ancestry = types.ancestry(TypeTag::of::<i64>());
        assert_eq!(ancestry, vec![TypeTag::of::<i64>(), TypeTag::of::<Number>()]);
    }

    #[test]
    fn render_uses_mode_and_falls_back_to_debug() {
        let types = registry();
        assert_eq!(types.render(&Value::new(5i64), StringMode::Message), "5");
        assert_eq!(types.render(&Value::new(5i64), StringMode::Debug), "int(5)");
        assert_eq!(types.render(&Value::new(1.5f32), StringMode::Message), "1.5");
    }

    #[test]
    fn render_list_joins_by_quantifier() {
        let types = registry();
        let values = vec![Value::new(1i64), Value::new(2i64), Value::new(3i64)];
        assert_eq!(types.render_list(&values, true, StringMode::Message), "1, 2 and 3");
        assert_eq!(types.render_list(&values, false, StringMode::Message), "1, 2 or 3");
        assert_eq!(types.render_list(&values[..1], false, StringMode::Message), "1");
    }

    #[test]
    fn serialize_round_trip() {
        let types = registry();
        let (code, text) = types.serialize(&Value::new(42i64)).unwrap();
        assert_eq!((code.as_str(), text.as_str()), ("integer", "42"));

        let back = types.deserialize(&code, &text).unwrap();
        assert_eq!(back.downcast_ref::<i64>(), Some(&42));
    }

    #[test]
    fn serialize_without_serializer_fails() {
        let types = registry();
        let result = types.serialize(&Value::new("x".to_string()));
        assert!(matches!(result, Err(RegistryError::NotSerializable(name)) if name == "string"));

        let unknown = types.serialize(&Value::new(1u16));
        assert!(matches!(unknown, Err(RegistryError::UnknownType(_))));
    }

    #[test]
    fn deserialize_unknown_code_name_fails() {
        let types = registry();
        let result = types.deserialize("vector", "1,2");
        assert!(matches!(result, Err(RegistryError::UnknownCodeName(_))));
    }

    #[test]
    fn changer_inherited_from_supertype() {
        let types = registry();
        assert!(types.changer_for(TypeTag::of::<i64>()).is_some());
        assert!(types.changer_for(TypeTag::of::<String>()).is_none());
    }

    #[test]
    fn user_names() {
        let types = registry();
        assert_eq!(types.user_name(TypeTag::of::<String>()), "text");
        assert_eq!(types.user_name(TypeTag::of::<u16>()), "u16");
    }

    #[test]
    fn join_list_edge_cases() {
        assert_eq!(join_list(&[], true), "");
        assert_eq!(join_list(&["x".to_string(), "y".to_string()], false), "x or y");
    }

    proptest::proptest! {
        #[test]
        fn join_list_keeps_every_part(
            parts in proptest::collection::vec("[a-z]{1,6}", 2..8),
            and: bool
        ) {
            let joined = join_list(&parts, and);
            let conjunction = if and { " and " } else { " or " };
            let (head, last) = joined.rsplit_once(conjunction).unwrap();
            proptest::prop_assert_eq!(last, parts[parts.len() - 1].as_str());
            let leading: Vec<&str> = head.split(", ").collect();
            proptest::prop_assert_eq!(leading, parts[..parts.len() - 1].to_vec());
        }
    }
}
