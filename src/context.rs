//! Request-scoped context token carried by session instances

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque request-scoped value handed to the manager and returned unchanged
/// by [`SessionStore::context`](crate::SessionStore::context).
///
/// The store never inspects it; it only carries it for the caller.
#[derive(Clone, Default)]
pub struct Context {
    value: Option<Arc<dyn Any + Send + Sync>>,
}

impl Context {
    /// An empty context
    pub fn background() -> Self {
        Self::default()
    }

    /// A context carrying an arbitrary value
    pub fn with_value<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
        }
    }

    /// Borrow the carried value if it has type `T`
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Whether both contexts carry the very same value
    pub fn same_as(&self, other: &Context) -> bool {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_value", &self.value.is_some())
            .finish()
    }
}
