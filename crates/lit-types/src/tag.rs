//! Semantic type identity
//!
//! Provides [`TypeTag`], the key every registry table is indexed by.

use std::any::{Any, TypeId};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Identity of a semantic type
///
/// Wraps a [`TypeId`] together with a readable name for diagnostics.
/// Equality and hashing only consider the [`TypeId`].
///
/// Marker types that never appear as element values (e.g. an abstract
/// "number" supertype) are tagged the same way as concrete element types.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag of a Rust type
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The top type: every tag is assignable to it
    #[inline]
    #[must_use]
    pub fn object() -> Self {
        Self {
            id: TypeId::of::<dyn Any + Send + Sync>(),
            name: "object",
        }
    }

    /// Check if this is the top type
    #[inline]
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.id == TypeId::of::<dyn Any + Send + Sync>()
    }

    /// Underlying Rust type id
    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully-qualified Rust type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name)
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn tag_equality_by_type() {
        assert_eq!(TypeTag::of::<i64>(), TypeTag::of::<i64>());
        assert_ne!(TypeTag::of::<i64>(), TypeTag::of::<i32>());
    }

    #[test]
    fn object_tag_is_distinct() {
        let object = TypeTag::object();
        assert!(object.is_object());
        assert!(!TypeTag::of::<String>().is_object());
        assert_eq!(object.name(), "object");
    }

    #[test]
    fn short_name_strips_path() {
        assert_eq!(TypeTag::of::<Marker>().short_name(), "Marker");
        assert_eq!(TypeTag::of::<Vec<u8>>().short_name(), "Vec");
        assert_eq!(TypeTag::of::<Marker>().to_string(), "Marker");
    }

    #[test]
    fn unsized_marker_tags() {
        let tag = TypeTag::of::<str>();
        assert_eq!(tag.name(), "str");
    }
}
