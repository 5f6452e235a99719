//! Bucket table: power-of-two array of singly linked chain heads.

use crate::entry::{Arena, EntryKey};
use std::collections::TryReserveError;

#[cfg(test)]
thread_local! {
    static FAIL_NEXT_GROW: core::cell::Cell<bool> = const { core::cell::Cell::new(false) };
}

/// Make the next `grow` on this thread report an allocation failure.
#[cfg(test)]
pub(crate) fn fail_next_grow() {
    FAIL_NEXT_GROW.with(|f| f.set(true));
}

/// Fold the high half of a raw hash into the low bits used for indexing.
#[inline]
pub(crate) fn spread(h: u32) -> u32 {
    h ^ (h >> 16)
}

/// Outcome of scanning one chain.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Probe {
    pub(crate) index: usize,
    /// Predecessor of `found`, or the chain's last entry on a miss.
    pub(crate) prev: Option<EntryKey>,
    pub(crate) found: Option<EntryKey>,
}

#[derive(Debug)]
pub(crate) struct BucketTable {
    heads: Vec<Option<EntryKey>>,
}

impl BucketTable {
    /// `capacity` must be a power of two.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            heads: vec![None; capacity],
        }
    }

    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        debug_assert!(capacity.is_power_of_two());
        let mut heads = Vec::new();
        heads.try_reserve_exact(capacity)?;
        heads.resize(capacity, None);
        Ok(Self { heads })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn index_of(&self, hash: u32) -> usize {
        hash as usize & (self.heads.len() - 1)
    }

    #[cfg(test)]
    pub(crate) fn head(&self, index: usize) -> Option<EntryKey> {
        self.heads[index]
    }

    /// Scan the chain for `hash`, calling `matches` only on entries whose
    /// stored hash is equal.
    pub(crate) fn probe<K, V>(
        &self,
        arena: &Arena<K, V>,
        hash: u32,
        mut matches: impl FnMut(&K) -> bool,
    ) -> Probe {
        let index = self.index_of(hash);
        let mut prev = None;
        let mut cursor = self.heads[index];
        while let Some(k) = cursor {
            let e = &arena[k];
            if e.hash == hash && matches(&e.key) {
                return Probe {
                    index,
                    prev,
                    found: Some(k),
                };
            }
            prev = Some(k);
            cursor = e.chain_next;
        }
        Probe {
            index,
            prev,
            found: None,
        }
    }

    /// Predecessor of `target` in chain `index`, located by node identity.
    pub(crate) fn predecessor<K, V>(
        &self,
        arena: &Arena<K, V>,
        index: usize,
        target: EntryKey,
    ) -> Option<EntryKey> {
        let mut prev = None;
        let mut cursor = self.heads[index];
        while let Some(k) = cursor {
            if k == target {
                break;
            }
            prev = Some(k);
            cursor = arena[k].chain_next;
        }
        prev
    }

    /// Link `node` after `tail` (the chain's last entry), or as the head of an
    /// empty chain.
    pub(crate) fn append<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        index: usize,
        tail: Option<EntryKey>,
        node: EntryKey,
    ) {
        arena[node].chain_next = None;
        match tail {
            Some(t) => arena[t].chain_next = Some(node),
            None => self.heads[index] = Some(node),
        }
    }

    /// Drop `node` from chain `index`; `prev` is its predecessor.
    pub(crate) fn unlink<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        index: usize,
        prev: Option<EntryKey>,
        node: EntryKey,
    ) {
        let next = arena[node].chain_next.take();
        match prev {
            Some(p) => arena[p].chain_next = next,
            None => self.heads[index] = next,
        }
    }

    /// Double the table and split every chain in place.
    ///
    /// Chain `i` is partitioned, keeping relative order, into entries whose
    /// `hash & old_capacity` bit is clear (stay at `i`) and those where it is
    /// set (move to `i + old_capacity`). On allocation failure nothing
    /// changes.
    pub(crate) fn grow<K, V>(&mut self, arena: &mut Arena<K, V>) -> Result<(), TryReserveError> {
        let old = self.heads.len();
        #[cfg(test)]
        if FAIL_NEXT_GROW.with(|f| f.replace(false)) {
            return Vec::<u8>::new().try_reserve(usize::MAX);
        }
        self.heads.try_reserve_exact(old)?;
        self.heads.resize(old * 2, None);

        for i in 0..old {
            let (mut lo_head, mut lo_tail) = (None, None);
            let (mut hi_head, mut hi_tail) = (None, None);
            let mut cursor = self.heads[i].take();
            while let Some(k) = cursor {
                let e = &mut arena[k];
                cursor = e.chain_next.take();
                let (head, tail): (&mut Option<EntryKey>, &mut Option<EntryKey>) =
                    if e.hash as usize & old == 0 {
                        (&mut lo_head, &mut lo_tail)
                    } else {
                        (&mut hi_head, &mut hi_tail)
                    };
                match *tail {
                    Some(t) => arena[t].chain_next = Some(k),
                    None => *head = Some(k),
                }
                *tail = Some(k);
            }
            self.heads[i] = lo_head;
            self.heads[i + old] = hi_head;
        }
        Ok(())
    }

    /// Zero every slot; capacity is kept.
    pub(crate) fn clear(&mut self) {
        self.heads.fill(None);
    }

    /// Walk chain `index` head to tail.
    pub(crate) fn chain<'a, K, V>(
        &self,
        arena: &'a Arena<K, V>,
        index: usize,
    ) -> impl Iterator<Item = EntryKey> + 'a {
        let mut cursor = self.heads[index];
        core::iter::from_fn(move || {
            let k = cursor?;
            cursor = arena.get(k).and_then(|e| e.chain_next);
            Some(k)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    fn chain_hashes(t: &BucketTable, arena: &Arena<u32, ()>, i: usize) -> Vec<u32> {
        t.chain(arena, i).map(|k| arena[k].hash).collect()
    }

    fn insert(t: &mut BucketTable, arena: &mut Arena<u32, ()>, id: u32, hash: u32) -> EntryKey {
        let p = t.probe(arena, hash, |k| *k == id);
        assert!(p.found.is_none());
        let node = arena.insert(Entry::new(id, (), hash));
        t.append(arena, p.index, p.prev, node);
        node
    }

    /// Invariant: `spread` folds the high 16 bits into the low 16.
    #[test]
    fn spread_mixes_high_bits_down() {
        assert_eq!(spread(0x0001_0000), 0x0001_0001);
        assert_eq!(spread(0xffff_0000), 0xffff_ffff);
        assert_eq!(spread(0x0000_1234), 0x0000_1234);
    }

    /// Invariant: Appending keeps a chain in insertion order.
    #[test]
    fn append_keeps_insertion_order_within_chain() {
        let mut arena = Arena::with_key();
        let mut t = BucketTable::try_with_capacity(4).unwrap();
        for (id, h) in [(1, 1), (2, 5), (3, 9)] {
            insert(&mut t, &mut arena, id, h);
        }
        assert_eq!(chain_hashes(&t, &arena, 1), vec![1, 5, 9]);
        assert!(t.head(0).is_none());
    }

    /// Invariant: A probe reports the predecessor on a hit and the chain tail on a miss.
    #[test]
    fn probe_reports_predecessor() {
        let mut arena = Arena::with_key();
        let mut t = BucketTable::try_with_capacity(4).unwrap();
        let a = insert(&mut t, &mut arena, 1, 2);
        let b = insert(&mut t, &mut arena, 2, 6);
        let p = t.probe(&arena, 6, |k| *k == 2);
        assert_eq!(p.found, Some(b));
        assert_eq!(p.prev, Some(a));
        assert_eq!(t.predecessor(&arena, 2, b), Some(a));
        assert_eq!(t.predecessor(&arena, 2, a), None);

        let miss = t.probe(&arena, 10, |k| *k == 3);
        assert!(miss.found.is_none());
        assert_eq!(miss.prev, Some(b));
    }

    /// Invariant: Key equality is consulted only for entries whose stored hash matches.
    #[test]
    fn equal_hash_is_required_before_key_compare() {
        let mut arena = Arena::with_key();
        let mut t = BucketTable::try_with_capacity(4).unwrap();
        insert(&mut t, &mut arena, 7, 3);
        let mut calls = 0;
        let p = t.probe(&arena, 7, |_| {
            calls += 1;
            true
        });
        assert!(p.found.is_none());
        assert_eq!(calls, 0);
    }

    /// Invariant: Unlinking the head, a middle entry or the tail keeps the rest of the
    /// chain in order.
    #[test]
    fn unlink_head_middle_and_tail() {
        let mut arena = Arena::with_key();
        let mut t = BucketTable::try_with_capacity(4).unwrap();
        let a = insert(&mut t, &mut arena, 1, 0);
        let b = insert(&mut t, &mut arena, 2, 4);
        let c = insert(&mut t, &mut arena, 3, 8);
        let d = insert(&mut t, &mut arena, 4, 12);

        t.unlink(&mut arena, 0, Some(a), b);
        assert_eq!(chain_hashes(&t, &arena, 0), vec![0, 8, 12]);
        t.unlink(&mut arena, 0, None, a);
        assert_eq!(chain_hashes(&t, &arena, 0), vec![8, 12]);
        t.unlink(&mut arena, 0, Some(c), d);
        assert_eq!(chain_hashes(&t, &arena, 0), vec![8]);
        t.unlink(&mut arena, 0, None, c);
        assert!(t.head(0).is_none());
    }

    /// Invariant: Doubling splits each chain into a low and a high half, each keeping
    /// relative order, and loses no entry.
    #[test]
    fn grow_splits_chains_stably() {
        let mut arena = Arena::with_key();
        let mut t = BucketTable::try_with_capacity(4).unwrap();
        // All land in bucket 1; bit 2 decides low/high after doubling.
        for (id, h) in [(1, 1), (2, 5), (3, 9), (4, 13), (5, 17)] {
            insert(&mut t, &mut arena, id, h);
        }
        t.grow(&mut arena).unwrap();
        assert_eq!(t.capacity(), 8);
        assert_eq!(chain_hashes(&t, &arena, 1), vec![1, 9, 17]);
        assert_eq!(chain_hashes(&t, &arena, 5), vec![5, 13]);
        let total: usize = (0..8).map(|i| t.chain(&arena, i).count()).sum();
        assert_eq!(total, 5);
    }

    /// Invariant: A failed grow leaves capacity and every chain untouched.
    #[test]
    fn failed_grow_changes_nothing() {
        let mut arena = Arena::with_key();
        let mut t = BucketTable::try_with_capacity(4).unwrap();
        for (id, h) in [(1, 1), (2, 5), (3, 2)] {
            insert(&mut t, &mut arena, id, h);
        }
        fail_next_grow();
        assert!(t.grow(&mut arena).is_err());
        assert_eq!(t.capacity(), 4);
        assert_eq!(chain_hashes(&t, &arena, 1), vec![1, 5]);
        assert_eq!(chain_hashes(&t, &arena, 2), vec![2]);
        // The hook fires once.
        t.grow(&mut arena).unwrap();
        assert_eq!(t.capacity(), 8);
    }

    /// Invariant: `clear` empties every bucket and keeps capacity.
    #[test]
    fn clear_keeps_capacity() {
        let mut arena = Arena::with_key();
        let mut t = BucketTable::try_with_capacity(16).unwrap();
        insert(&mut t, &mut arena, 1, 3);
        t.clear();
        assert_eq!(t.capacity(), 16);
        assert!((0..16).all(|i| t.head(i).is_none()));
    }
}
