//! Dynamically-typed element handles
//!
//! Provides [`Value`], the element type stored inside literals.

use crate::tag::TypeTag;
use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Anything that can be held by a literal
///
/// Blanket-implemented for every `'static + Debug + Send + Sync` type.
/// Elements that must be mutable in place carry their own interior
/// mutability; literals only ever hand out shared references.
pub trait Element: Any + Debug + Send + Sync {
    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug + Send + Sync> Element for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handle to one element of a concrete runtime type
///
/// # Invariants
/// - `tag` is always the tag of the concrete type behind `inner`
/// - Cloning shares the element (Arc), so in-place mutation through
///   interior mutability is visible to every clone
#[derive(Clone)]
pub struct Value {
    tag: TypeTag,
    inner: Arc<dyn Element>,
}

impl Value {
    /// Wrap an element
    #[inline]
    #[must_use]
    pub fn new<T: Element>(element: T) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            inner: Arc::new(element),
        }
    }

    /// Wrap an already shared element
    #[inline]
    #[must_use]
    pub fn from_arc<T: Element>(element: Arc<T>) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            inner: element,
        }
    }

    /// Concrete runtime type of the element
    #[inline]
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Check the concrete type
    #[inline]
    #[must_use]
    pub fn is<T: Element>(&self) -> bool {
        self.tag == TypeTag::of::<T>()
    }

    /// Borrow as a concrete type
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Element>(&self) -> Option<&T> {
        Element::as_any(&*self.inner).downcast_ref::<T>()
    }

    /// Borrow the element as a trait object
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> &dyn Element {
        &*self.inner
    }

    /// Check if both handles share the same element
    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.inner, f)
    }
}
