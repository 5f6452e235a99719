//! Hash and equality capabilities the map is parameterized over.
//!
//! A map holds one `KeyHasher` and one `KeyEquator`. They must agree: keys
//! the equator considers equal must hash identically. Lookups may use a
//! borrowed form `Q` of the key type `K`; the capabilities must then give the
//! same answers for `K` and for `Q`, the contract std's `Borrow` already asks
//! of `Hash` and `Eq`.

use core::hash::{BuildHasher, Hash};
use core::ops::Deref;
use hashbrown::hash_map::DefaultHashBuilder;

/// Produces the raw 32-bit hash of a key. The map spreads it before use.
pub trait KeyHasher<Q: ?Sized> {
    fn hash_key(&self, key: &Q) -> u32;
}

/// Decides whether two keys name the same entry.
pub trait KeyEquator<Q: ?Sized> {
    fn eq_keys(&self, a: &Q, b: &Q) -> bool;
}

/// Hashes any `Hash` key through a `BuildHasher`, folding 64 bits to 32.
#[derive(Clone, Debug, Default)]
pub struct StdHash<S = DefaultHashBuilder> {
    build: S,
}

impl<S> StdHash<S> {
    pub fn with_build_hasher(build: S) -> Self {
        Self { build }
    }
}

impl<Q, S> KeyHasher<Q> for StdHash<S>
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &Q) -> u32 {
        let h = self.build.hash_one(key);
        (h ^ (h >> 32)) as u32
    }
}

/// Compares keys with their `Eq` impl.
#[derive(Copy, Clone, Debug, Default)]
pub struct StdEq;

impl<Q: ?Sized + Eq> KeyEquator<Q> for StdEq {
    #[inline]
    fn eq_keys(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}

/// Hashes pointer-like keys (`&T`, `Rc<T>`, `Box<T>`, ...) by pointee address.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityHash;

impl<P: Deref> KeyHasher<P> for IdentityHash {
    #[inline]
    fn hash_key(&self, key: &P) -> u32 {
        let addr = (&**key as *const P::Target).cast::<()>() as usize as u64;
        (addr ^ (addr >> 32)) as u32
    }
}

/// Two pointer-like keys are equal only when they point at the same value.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityEq;

impl<P: Deref> KeyEquator<P> for IdentityEq {
    #[inline]
    fn eq_keys(&self, a: &P, b: &P) -> bool {
        core::ptr::eq(&**a, &**b)
    }
}

/// Adapts a plain function or closure into a `KeyHasher`.
#[derive(Copy, Clone, Debug)]
pub struct HashFn<F>(pub F);

impl<Q, F> KeyHasher<Q> for HashFn<F>
where
    Q: ?Sized,
    F: Fn(&Q) -> u32,
{
    #[inline]
    fn hash_key(&self, key: &Q) -> u32 {
        (self.0)(key)
    }
}

/// Adapts a plain function or closure into a `KeyEquator`.
#[derive(Copy, Clone, Debug)]
pub struct EqFn<F>(pub F);

impl<Q, F> KeyEquator<Q> for EqFn<F>
where
    Q: ?Sized,
    F: Fn(&Q, &Q) -> bool,
{
    #[inline]
    fn eq_keys(&self, a: &Q, b: &Q) -> bool {
        (self.0)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn std_hash_agrees_between_owned_and_borrowed() {
        let h = StdHash::<DefaultHashBuilder>::default();
        let owned = String::from("label");
        assert_eq!(
            KeyHasher::<String>::hash_key(&h, &owned),
            KeyHasher::<str>::hash_key(&h, "label")
        );
    }

    #[test]
    fn identity_distinguishes_equal_values_at_different_addresses() {
        let a = Rc::new(String::from("same"));
        let b = Rc::new(String::from("same"));
        let a2 = Rc::clone(&a);
        assert!(IdentityEq.eq_keys(&a, &a2));
        assert!(!IdentityEq.eq_keys(&a, &b));
        assert_eq!(IdentityHash.hash_key(&a), IdentityHash.hash_key(&a2));
    }

    #[test]
    fn identity_works_for_plain_references() {
        let xs = [1u32, 1u32];
        let (r0, r1) = (&xs[0], &xs[1]);
        assert!(IdentityEq.eq_keys(&r0, &r0));
        assert!(!IdentityEq.eq_keys(&r0, &r1));
    }

    #[test]
    fn closure_adapters() {
        let len_hash = HashFn(|s: &str| s.len() as u32);
        let ci_eq = EqFn(|a: &str, b: &str| a.eq_ignore_ascii_case(b));
        assert_eq!(len_hash.hash_key("abc"), 3);
        assert!(ci_eq.eq_keys("HeLp", "help"));
        assert!(!ci_eq.eq_keys("help", "halp"));
    }
}
