//! Key wrappers for arguments that have no useful `Eq + Hash` of their own.
//!
//! - [`FloatKey`]: `f64` under same-value-zero equality (every NaN equals
//!   every other NaN, `0.0 == -0.0`).
//! - [`IdentityKey`]: an `Rc<T>` compared by pointer, for memoizing on object
//!   identity instead of structural equality.
//!
//! ```
//! use std::rc::Rc;
//! use memokit::key::{FloatKey, IdentityKey};
//!
//! assert_eq!(FloatKey::from(f64::NAN), FloatKey::from(-f64::NAN));
//! assert_eq!(FloatKey::from(0.0), FloatKey::from(-0.0));
//!
//! let a = Rc::new(vec![1, 2]);
//! let b = Rc::new(vec![1, 2]);
//! assert_ne!(IdentityKey::new(a.clone()), IdentityKey::new(b));
//! assert_eq!(IdentityKey::new(a.clone()), IdentityKey::new(a));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// `f64` with same-value-zero equality and a matching hash.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(f64);

impl FloatKey {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    fn canonical_bits(self) -> u64 {
        if self.0.is_nan() {
            f64::NAN.to_bits()
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl From<f64> for FloatKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl fmt::Display for FloatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared pointer compared and hashed by address.
pub struct IdentityKey<T: ?Sized>(Rc<T>);

impl<T: ?Sized> IdentityKey<T> {
    pub fn new(value: Rc<T>) -> Self {
        Self(value)
    }

    pub fn get(&self) -> &Rc<T> {
        &self.0
    }

    pub fn into_inner(self) -> Rc<T> {
        self.0
    }
}

impl<T: ?Sized> Clone for IdentityKey<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for IdentityKey<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for IdentityKey<T> {}

impl<T: ?Sized> Hash for IdentityKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for IdentityKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentityKey")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .field(&&*self.0)
            .finish()
    }
}

impl<T: ?Sized> From<Rc<T>> for IdentityKey<T> {
    fn from(value: Rc<T>) -> Self {
        Self(value)
    }
}
