use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// An opaque, reference-counted value carried on a port.
///
/// Handles carry objects that have no JSON form, such as an authenticated
/// API session. Cloning a handle clones the `Arc`, never the value, so every
/// downstream component sees the same instance.
#[derive(Clone)]
pub struct Handle {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Handle {
    /// Wrap a value in a new handle.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an existing `Arc` without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            type_name: type_name::<T>(),
            inner: value,
        }
    }

    /// Fully qualified type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Last path segment of the wrapped type name (e.g. `TwilioClient`).
    pub fn short_type_name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }

    /// Return the wrapped value if it is a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Returns `true` if both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.short_type_name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Session {
        id: u32,
    }

    #[test]
    fn downcast_to_original_type() {
        let handle = Handle::new(Session { id: 7 });
        let session = handle.downcast::<Session>().expect("should downcast");
        assert_eq!(session.id, 7);
    }

    #[test]
    fn downcast_to_wrong_type_fails() {
        let handle = Handle::new(Session { id: 1 });
        assert!(handle.downcast::<String>().is_none());
    }

    #[test]
    fn clones_share_the_value() {
        let shared = Arc::new(Session { id: 3 });
        let a = Handle::from_arc(Arc::clone(&shared));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(Arc::ptr_eq(&shared, &b.downcast::<Session>().unwrap()));
    }

    #[test]
    fn debug_shows_short_type_name() {
        let handle = Handle::new(Session { id: 1 });
        assert_eq!(handle.short_type_name(), "Session");
        assert_eq!(format!("{handle:?}"), "Handle(\"Session\")");
    }
}
