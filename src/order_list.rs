//! Doubly linked traversal order threaded through the arena.
//!
//! Head is the most relevant entry (oldest insert in insertion order, most
//! recent touch in access order); tail is the least relevant.

use crate::entry::{Arena, EntryKey};

#[derive(Debug, Default)]
pub(crate) struct OrderList {
    head: Option<EntryKey>,
    tail: Option<EntryKey>,
}

impl OrderList {
    pub(crate) const fn new() -> Self {
        Self {
            head: None,
            tail: None,
        }
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<EntryKey> {
        self.head
    }

    #[inline]
    pub(crate) fn tail(&self) -> Option<EntryKey> {
        self.tail
    }

    pub(crate) fn push_back<K, V>(&mut self, arena: &mut Arena<K, V>, node: EntryKey) {
        let old_tail = self.tail;
        {
            let e = &mut arena[node];
            e.order_prev = old_tail;
            e.order_next = None;
        }
        match old_tail {
            Some(t) => arena[t].order_next = Some(node),
            None => self.head = Some(node),
        }
        self.tail = Some(node);
    }

    pub(crate) fn push_front<K, V>(&mut self, arena: &mut Arena<K, V>, node: EntryKey) {
        let old_head = self.head;
        {
            let e = &mut arena[node];
            e.order_prev = None;
            e.order_next = old_head;
        }
        match old_head {
            Some(h) => arena[h].order_prev = Some(node),
            None => self.tail = Some(node),
        }
        self.head = Some(node);
    }

    /// Relink a live node at the head. No-op when it already is the head.
    pub(crate) fn move_to_front<K, V>(&mut self, arena: &mut Arena<K, V>, node: EntryKey) {
        if self.head == Some(node) {
            return;
        }
        self.unlink(arena, node);
        self.push_front(arena, node);
    }

    /// Detach a live node, leaving its own links cleared.
    pub(crate) fn unlink<K, V>(&mut self, arena: &mut Arena<K, V>, node: EntryKey) {
        let (prev, next) = {
            let e = &mut arena[node];
            (e.order_prev.take(), e.order_next.take())
        };
        match (prev, next) {
            // Sole entry: list becomes empty.
            (None, None) => {
                self.head = None;
                self.tail = None;
            }
            // Head.
            (None, Some(n)) => {
                arena[n].order_prev = None;
                self.head = Some(n);
            }
            // Tail.
            (Some(p), None) => {
                arena[p].order_next = None;
                self.tail = Some(p);
            }
            (Some(p), Some(n)) => {
                arena[p].order_next = Some(n);
                arena[n].order_prev = Some(p);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    fn forward(list: &OrderList, arena: &Arena<char, ()>) -> String {
        let mut out = String::new();
        let mut cursor = list.head();
        while let Some(k) = cursor {
            out.push(arena[k].key);
            cursor = arena[k].order_next;
        }
        out
    }

    fn backward(list: &OrderList, arena: &Arena<char, ()>) -> String {
        let mut out = String::new();
        let mut cursor = list.tail();
        while let Some(k) = cursor {
            out.push(arena[k].key);
            cursor = arena[k].order_prev;
        }
        out
    }

    fn build(keys: &str) -> (OrderList, Arena<char, ()>, Vec<EntryKey>) {
        let mut arena = Arena::with_key();
        let mut list = OrderList::new();
        let nodes = keys
            .chars()
            .map(|c| {
                let k = arena.insert(Entry::new(c, (), 0));
                list.push_back(&mut arena, k);
                k
            })
            .collect();
        (list, arena, nodes)
    }

    #[test]
    fn push_back_and_front() {
        let (mut list, mut arena, _) = build("bc");
        let a = arena.insert(Entry::new('a', (), 0));
        list.push_front(&mut arena, a);
        assert_eq!(forward(&list, &arena), "abc");
        assert_eq!(backward(&list, &arena), "cba");
    }

    #[test]
    fn unlink_covers_every_position() {
        let (mut list, mut arena, n) = build("abcd");
        list.unlink(&mut arena, n[2]);
        assert_eq!(forward(&list, &arena), "abd");
        list.unlink(&mut arena, n[0]);
        assert_eq!(forward(&list, &arena), "bd");
        list.unlink(&mut arena, n[3]);
        assert_eq!(forward(&list, &arena), "b");
        assert_eq!(backward(&list, &arena), "b");
        list.unlink(&mut arena, n[1]);
        assert!(list.head().is_none());
        assert!(list.tail().is_none());
    }

    #[test]
    fn move_to_front_from_tail_and_middle() {
        let (mut list, mut arena, n) = build("abc");
        list.move_to_front(&mut arena, n[2]);
        assert_eq!(forward(&list, &arena), "cab");
        assert_eq!(backward(&list, &arena), "bac");
        list.move_to_front(&mut arena, n[0]);
        assert_eq!(forward(&list, &arena), "acb");
        list.move_to_front(&mut arena, n[0]);
        assert_eq!(forward(&list, &arena), "acb");
        assert_eq!(backward(&list, &arena), "bca");
    }
}
