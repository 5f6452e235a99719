//! Entry nodes and the arena that owns them.
//!
//! Every link (chain successor, order-list neighbours, bucket heads) is a
//! generational `EntryKey` into one `SlotMap`. Allocating a node is a slot
//! insert; freeing it is a slot removal, done only after both the chain and
//! the order list have dropped every link to it.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub(crate) struct EntryKey;
}

pub(crate) type Arena<K, V> = SlotMap<EntryKey, Entry<K, V>>;

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Spread hash, computed once at insertion.
    pub(crate) hash: u32,
    pub(crate) chain_next: Option<EntryKey>,
    pub(crate) order_prev: Option<EntryKey>,
    pub(crate) order_next: Option<EntryKey>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u32) -> Self {
        Self {
            key,
            value,
            hash,
            chain_next: None,
            order_prev: None,
            order_next: None,
        }
    }
}
