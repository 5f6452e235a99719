//! Debug-only probe guard.
//!
//! Hashing and key comparison are the only places where user code runs
//! inside the map. The guard marks that window; a nested probe on the same
//! map (for example from a `KeyEquator` that reaches back into the map
//! through a raw pointer) panics in debug builds. Release builds compile
//! the guard away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug, Default)]
pub(crate) struct ProbeGuard {
    #[cfg(debug_assertions)]
    probing: Cell<bool>,
}

impl ProbeGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            probing: Cell::new(false),
        }
    }

    /// Open a probe window. Panics in debug builds if one is already open.
    #[inline]
    pub(crate) fn enter(&self) -> ProbeScope<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.probing.replace(true),
                "reentrancy detected: hasher or equator re-entered the map during a probe"
            );
        }
        ProbeScope {
            #[cfg(debug_assertions)]
            owner: self,
            _borrow: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_probing(&self) -> bool {
        #[cfg(debug_assertions)]
        {
            self.probing.get()
        }
        #[cfg(not(debug_assertions))]
        {
            false
        }
    }
}

/// Closes the probe window on drop.
pub(crate) struct ProbeScope<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ProbeGuard,
    _borrow: PhantomData<&'a ProbeGuard>,
}

impl Drop for ProbeScope<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.probing.set(false);
    }
}
