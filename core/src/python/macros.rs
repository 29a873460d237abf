//! Macros for reducing PyO3 boilerplate in enum wrappers

/// Implements conversions to and from the wrapped enum plus a hash helper
/// backing `__hash__`
macro_rules! impl_py_wrapper {
    ($py_type:ty, $inner_type:ty) => {
        impl From<$inner_type> for $py_type {
            fn from(inner: $inner_type) -> Self {
                Self { inner }
            }
        }

        impl From<$py_type> for $inner_type {
            fn from(py: $py_type) -> Self {
                py.inner
            }
        }

        impl $py_type {
            fn inner_hash(&self) -> u64 {
                use std::hash::{Hash, Hasher};
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                self.inner.hash(&mut hasher);
                hasher.finish()
            }
        }
    };
}

pub(crate) use impl_py_wrapper;
