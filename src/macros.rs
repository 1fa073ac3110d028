#![allow(unused_macros)]

/// Helper macro for locking items, mapping a poisoned lock to [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let mut queue = lock!(self.queue)?;
///  queue.push(op);
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)
    };
}

/// Builds a [`Signature`](crate::host::signature::Signature) from parameter types.
///
/// Each entry is anything convertible into a [`TypeSig`](crate::host::signature::TypeSig):
/// a type name or an already built `TypeSig`.
///
/// ```rust
/// use hostbridge::{host::signature::TypeSig, signature};
///
/// let sig = signature!["System.Int32", TypeSig::by_ref("System.Object")];
/// assert_eq!(sig.to_string(), "System.Int32, System.Object&");
/// assert!(signature![].is_empty());
/// ```
#[macro_export]
macro_rules! signature {
    () => {
        $crate::host::signature::Signature::empty()
    };
    ($($ty:expr),+ $(,)?) => {
        $crate::host::signature::Signature::new(vec![
            $($crate::host::signature::TypeSig::from($ty)),+
        ])
    };
}
