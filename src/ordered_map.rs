//! OrderedMap: chained hash table plus a traversal-order list over one arena.

use crate::bucket_table::{spread, BucketTable, Probe};
use crate::entry::{Arena, Entry, EntryKey};
use crate::error::SetupError;
use crate::hashing::{KeyEquator, KeyHasher, StdEq, StdHash};
use crate::options::{threshold_for, MapOptions, OrderingMode};
use crate::order_list::OrderList;
use crate::reentrancy::ProbeGuard;
use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;

pub struct OrderedMap<K, V, H = StdHash, E = StdEq> {
    hasher: H,
    equator: E,
    buckets: BucketTable,
    order: OrderList,
    arena: Arena<K, V>,
    load_factor: f32,
    threshold: usize,
    ordering: OrderingMode,
    guard: ProbeGuard,
}

impl<K, V> OrderedMap<K, V> {
    /// Empty map with default options, hashing through `Hash`/`Eq`.
    pub fn new() -> Self {
        let options = MapOptions::default();
        let buckets = BucketTable::new(options.capacity);
        Self::from_parts(options, buckets, StdHash::default(), StdEq)
    }

    pub fn with_options(options: MapOptions) -> Result<Self, SetupError> {
        Self::setup(options, StdHash::default(), StdEq)
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H, E> OrderedMap<K, V, H, E> {
    /// Build a map from options and explicit hash/equality capabilities.
    ///
    /// Fails on a non-positive or non-finite load factor, on a capacity with
    /// no power of two above it, and when the bucket array cannot be
    /// allocated.
    pub fn setup(options: MapOptions, hasher: H, equator: E) -> Result<Self, SetupError> {
        let capacity = options.resolve()?;
        let buckets = BucketTable::try_with_capacity(capacity)
            .map_err(|_| SetupError::Allocation { capacity })?;
        let options = MapOptions {
            capacity,
            ..options
        };
        Ok(Self::from_parts(options, buckets, hasher, equator))
    }

    fn from_parts(options: MapOptions, buckets: BucketTable, hasher: H, equator: E) -> Self {
        tracing::debug!(
            capacity = buckets.capacity(),
            load_factor = options.load_factor,
            ordering = ?options.ordering,
            "ordered map ready"
        );
        Self {
            hasher,
            equator,
            threshold: threshold_for(buckets.capacity(), options.load_factor),
            buckets,
            order: OrderList::new(),
            arena: Arena::with_key(),
            load_factor: options.load_factor,
            ordering: options.ordering,
            guard: ProbeGuard::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Current bucket count; always a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Largest length that does not trigger a resize at the current capacity.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn equator(&self) -> &E {
        &self.equator
    }

    /// Most relevant entry (head of the order list), without promotion.
    pub fn front(&self) -> Option<(&K, &V)> {
        self.order
            .head()
            .map(|k| &self.arena[k])
            .map(|e| (&e.key, &e.value))
    }

    /// Least relevant entry (tail of the order list), without promotion.
    pub fn back(&self) -> Option<(&K, &V)> {
        self.order
            .tail()
            .map(|k| &self.arena[k])
            .map(|e| (&e.key, &e.value))
    }

    /// Remove and return the least relevant entry. In access order this is
    /// the least recently used one.
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let node = self.order.tail()?;
        let index = self.buckets.index_of(self.arena[node].hash);
        let prev = self.buckets.predecessor(&self.arena, index, node);
        self.remove_node(index, prev, node)
    }

    /// Drop every entry, head to tail. Capacity is kept.
    ///
    /// The map is emptied before any key or value is dropped, so a panicking
    /// `Drop` leaves it empty and consistent; the remaining entries are then
    /// dropped during unwinding.
    pub fn clear(&mut self) {
        let released = self.arena.len();
        let mut cursor = self.order.head();
        self.order.clear();
        self.buckets.clear();
        let mut detached = mem::take(&mut self.arena);
        while let Some(k) = cursor {
            cursor = detached.remove(k).and_then(|e| e.order_next);
        }
        debug_assert!(detached.is_empty());
        // Hand the emptied slot storage back for reuse.
        self.arena = detached;
        tracing::trace!(released, capacity = self.buckets.capacity(), "ordered map cleared");
    }

    /// Tear the map down: release every entry, then the bucket array.
    pub fn destroy(mut self) {
        self.clear();
    }

    /// Lazy head-to-tail traversal.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            cursor: self.order.head(),
            remaining: self.arena.len(),
        }
    }

    /// Snapshot of all entries in order.
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    pub fn keys(&self) -> Vec<&K> {
        self.iter().map(|(k, _)| k).collect()
    }

    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }

    /// Look `q` up without touching the order list.
    fn locate<Q>(&self, q: &Q) -> (u32, Probe)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        let _g = self.guard.enter();
        let hash = spread(self.hasher.hash_key(q));
        let probe = self.buckets.probe(&self.arena, hash, |stored| {
            self.equator.eq_keys(q, <K as Borrow<Q>>::borrow(stored))
        });
        (hash, probe)
    }

    fn promote(&mut self, node: EntryKey) {
        if self.ordering == OrderingMode::AccessOrder {
            self.order.move_to_front(&mut self.arena, node);
        }
    }

    /// Unlink `node` from its chain and from the order list, then free it.
    fn remove_node(
        &mut self,
        index: usize,
        prev: Option<EntryKey>,
        node: EntryKey,
    ) -> Option<(K, V)> {
        self.buckets.unlink(&mut self.arena, index, prev, node);
        self.order.unlink(&mut self.arena, node);
        self.arena.remove(node).map(|e| (e.key, e.value))
    }

    /// Double capacity. An allocation failure leaves the table as it was and
    /// the map keeps working above its load factor.
    fn grow(&mut self) {
        let old = self.buckets.capacity();
        match self.buckets.grow(&mut self.arena) {
            Ok(()) => {
                self.threshold = threshold_for(self.buckets.capacity(), self.load_factor);
                tracing::trace!(
                    old_capacity = old,
                    new_capacity = self.buckets.capacity(),
                    len = self.arena.len(),
                    "bucket table doubled"
                );
            }
            Err(err) => {
                tracing::warn!(
                    capacity = old,
                    len = self.arena.len(),
                    error = %err,
                    "bucket table could not grow; continuing above load factor"
                );
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn with_raw_capacity(
        capacity: usize,
        load_factor: f32,
        ordering: OrderingMode,
        hasher: H,
        equator: E,
    ) -> Self {
        let options = MapOptions {
            capacity,
            load_factor,
            ordering,
        };
        let buckets = BucketTable::try_with_capacity(capacity).unwrap();
        Self::from_parts(options, buckets, hasher, equator)
    }

    #[cfg(test)]
    pub(crate) fn bucket_index_of<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        let (_, probe) = self.locate(q);
        let node = probe.found?;
        (0..self.buckets.capacity())
            .find(|&i| self.buckets.chain(&self.arena, i).any(|k| k == node))
    }

    #[cfg(test)]
    pub(crate) fn is_probing(&self) -> bool {
        self.guard.is_probing()
    }
}

impl<K, V, H, E> OrderedMap<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEquator<K>,
{
    /// Insert or overwrite; returns the superseded value.
    ///
    /// In access order both a fresh insert and an overwrite leave the entry
    /// at the head.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.replace(key, value).map(|(_, v)| v)
    }

    /// Like `put`, but hands back the superseded key along with its value.
    /// The stored key is replaced by `key`; node identity is preserved.
    pub fn replace(&mut self, key: K, value: V) -> Option<(K, V)> {
        let (hash, probe) = self.locate(&key);

        if let Some(node) = probe.found {
            let e = &mut self.arena[node];
            let old_key = mem::replace(&mut e.key, key);
            let old_value = mem::replace(&mut e.value, value);
            self.promote(node);
            return Some((old_key, old_value));
        }

        let node = self.arena.insert(Entry::new(key, value, hash));
        self.buckets.append(&mut self.arena, probe.index, probe.prev, node);
        match self.ordering {
            OrderingMode::InsertionOrder => self.order.push_back(&mut self.arena, node),
            OrderingMode::AccessOrder => self.order.push_front(&mut self.arena, node),
        }
        if self.arena.len() > self.threshold {
            self.grow();
        }
        None
    }

    /// Walk both structures and panic on any broken invariant.
    pub fn debug_validate(&self) {
        let len = self.arena.len();
        let capacity = self.buckets.capacity();
        assert!(capacity.is_power_of_two(), "capacity {} not a power of two", capacity);

        let mut chained = 0usize;
        for i in 0..capacity {
            let chain: Vec<EntryKey> = self.buckets.chain(&self.arena, i).take(len + 1).collect();
            assert!(chain.len() <= len, "chain {} longer than the map (cycle?)", i);
            for (pos, &k) in chain.iter().enumerate() {
                let e = self.arena.get(k).expect("chain links to a freed entry");
                assert_eq!(self.buckets.index_of(e.hash), i, "entry filed under wrong bucket");
                for &other in &chain[pos + 1..] {
                    let o = &self.arena[other];
                    assert!(
                        !(o.hash == e.hash && self.equator.eq_keys(&e.key, &o.key)),
                        "duplicate key in chain {}",
                        i
                    );
                }
            }
            chained += chain.len();
        }
        assert_eq!(chained, len, "chain membership does not match len");

        match (self.order.head(), self.order.tail()) {
            (None, None) => assert_eq!(len, 0, "empty order list with live entries"),
            (Some(h), Some(t)) => {
                assert!(self.arena[h].order_prev.is_none(), "head has a predecessor");
                assert!(self.arena[t].order_next.is_none(), "tail has a successor");
                let mut walked = 0usize;
                let mut last = None;
                let mut cursor = Some(h);
                while let Some(k) = cursor {
                    walked += 1;
                    assert!(walked <= len, "order list longer than the map (cycle?)");
                    let e = self.arena.get(k).expect("order list links to a freed entry");
                    assert_eq!(e.order_prev, last, "order list back link mismatch");
                    last = Some(k);
                    cursor = e.order_next;
                }
                assert_eq!(last, Some(t), "forward walk does not end at tail");
                assert_eq!(walked, len, "order list length does not match len");
            }
            _ => panic!("order list has exactly one of head/tail"),
        }
    }
}

impl<K, V, H, E> OrderedMap<K, V, H, E> {
    /// Value for `q`. In access order a hit moves the entry to the head.
    pub fn get<Q>(&mut self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        let node = self.locate(q).1.found?;
        self.promote(node);
        Some(&self.arena[node].value)
    }

    /// Mutable value for `q`; promotes like `get`.
    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        let node = self.locate(q).1.found?;
        self.promote(node);
        Some(&mut self.arena[node].value)
    }

    /// Presence check; promotes like `get` on a hit.
    pub fn contains<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        self.get(q).is_some()
    }

    /// Value for `q` without any reordering, in either mode.
    pub fn peek<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        let node = self.locate(q).1.found?;
        Some(&self.arena[node].value)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Remove `q`, handing back the stored key and value.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        E: KeyEquator<Q>,
    {
        let (_, probe) = self.locate(q);
        let node = probe.found?;
        self.remove_node(probe.index, probe.prev, node)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H, E> fmt::Debug for OrderedMap<K, V, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedMap")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("ordering", &self.ordering)
            .field("entries", &self.entries())
            .finish()
    }
}

impl<K, V, H, E> Extend<(K, V)> for OrderedMap<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEquator<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<K, V>
where
    StdHash: KeyHasher<K>,
    StdEq: KeyEquator<K>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = OrderedMap::new();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a OrderedMap<K, V, H, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Head-to-tail iterator over an `OrderedMap`.
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    cursor: Option<EntryKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.arena.get(self.cursor?)?;
        self.cursor = e.order_next;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            arena: self.arena,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}
