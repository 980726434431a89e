//! Shared, mutable handles to record instances.
//!
//! A [`Gc`] is a reference counted pointer with interior mutability. There is
//! no collector: a record that stores a handle to itself forms a cycle and is
//! reclaimed at process exit. The cycle-safe equality, hashing and display
//! routines in [`crate::records`] are what make such values usable at all.

use std::{fmt, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct Gc<T: ?Sized> {
    inner: Arc<RwLock<T>>,
}

impl<T> Gc<T> {
    pub fn new(t: T) -> Gc<T> {
        Self {
            inner: Arc::new(RwLock::new(t)),
        }
    }
}

impl<T: ?Sized> Gc<T> {
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    /// Identity comparison: do the two handles point at the same allocation?
    pub fn ptr_eq(lhs: &Self, rhs: &Self) -> bool {
        Arc::ptr_eq(&lhs.inner, &rhs.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl<T: ?Sized> Clone for Gc<T> {
    fn clone(&self) -> Gc<T> {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Gc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gc({:#x})", self.addr())
    }
}
