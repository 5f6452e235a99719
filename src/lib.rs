//! ordered-chain-map: a single-threaded chained hash map that also keeps a
//! doubly linked traversal order, in insertion order or access (LRU) order.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep two structures over the same entries consistent under
//!   insert, overwrite, remove, lookup and resize:
//!   - a power-of-two bucket table of singly linked collision chains, and
//!   - an order list threading every live entry exactly once.
//! - Layers:
//!   - `entry`: the node type and the `slotmap` arena that owns every node.
//!     All links are generational arena keys; there are no raw pointers.
//!   - `bucket_table`: spread hash, chain probing, chain append/unlink and
//!     the stable split used when the table doubles.
//!   - `order_list`: head/tail plus push, relink-to-head and unlink.
//!   - `ordered_map`: `OrderedMap<K, V, H, E>`, the controller. Each mutating
//!     case (fresh insert, overwrite, remove) is a single method that updates
//!     the chain and the order list together before returning.
//!
//! Constraints
//! - Single-threaded; no internal locking.
//! - Capacity is a power of two, at least 16, and never shrinks.
//! - One node per live key; an overwrite keeps the node and swaps key and
//!   value in place.
//! - A resize happens only after a fresh insert pushes `len` past
//!   `capacity * load_factor`. If the bucket array cannot grow, the map logs
//!   a warning and keeps working with longer chains.
//!
//! Hashing
//! - Hashing and equality are capabilities (`KeyHasher`, `KeyEquator`) the
//!   map is generic over. Defaults go through `Hash`/`Eq`; `IdentityHash` and
//!   `IdentityEq` key pointer-like values by address.
//! - Each entry stores its spread hash; rehashing never calls back into user
//!   code. Equality is only consulted when stored hashes match.
//!
//! Ordering
//! - `InsertionOrder`: head is the oldest insert; nothing reorders.
//! - `AccessOrder`: `put` (fresh or overwrite), `get`, `get_mut` and
//!   `contains` move the entry to the head. A fresh insert is therefore the
//!   most recent entry. `peek`, `front`, `back` and the exports never reorder.
//!
//! Reentrancy
//! - A debug-only guard brackets hashing and probing. A hasher or equator
//!   that reaches back into the same map panics in debug builds.
//!
//! Diagnostics
//! - `tracing` events: setup at `debug`, resizes and clears at `trace`, a
//!   skipped resize at `warn`.
//! - `debug_validate` walks both structures and panics on any broken
//!   invariant.

mod bucket_table;
mod entry;
pub mod error;
pub mod hashing;
pub mod options;
mod order_list;
pub mod ordered_map;
mod ordered_map_proptest;
mod reentrancy;

// Public surface
pub use error::SetupError;
pub use hashing::{EqFn, HashFn, IdentityEq, IdentityHash, KeyEquator, KeyHasher, StdEq, StdHash};
pub use options::{MapOptions, OrderingMode, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MIN_CAPACITY};
pub use ordered_map::{Iter, OrderedMap};
