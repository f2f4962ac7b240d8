//! bucket-hashmap: a single-owner hash map built on separate chaining,
//! with first-write-wins inserts and borrow-checked positional cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Storage is a `Vec` of buckets, each bucket a `Vec` of entries. An
//!   entry lives in bucket `hash(key) % bucket_count`.
//! - Layers:
//!   - ResizePolicy: pure decision of how many buckets `len` entries
//!     need (load factor 10, resize factor 2 by default).
//!   - BucketHashMap<K, V, S>: owns the buckets, the element count and
//!     the `BuildHasher`; applies the policy on every successful insert
//!     and every actual removal.
//!   - Cursor / CursorMut: `(bucket, slot)` positions borrowing the
//!     bucket slice; the iterators are built on the same walk.
//!
//! Constraints
//! - Unique keys. `insert` on a present key is a no-op that keeps the
//!   existing value and reports `false`.
//! - At least one bucket at all times. After every mutation
//!   `len <= buckets * load_factor` and, unless a single bucket is
//!   left, `len * load_factor >= buckets`. A policy with
//!   `load_factor² < resize_factor` may skip a shrink that would break
//!   the first bound.
//! - Iteration order is bucket-ascending, then insertion order within a
//!   bucket. It is neither key order nor global insertion order.
//!
//! Cursor validity
//! - A cursor holds `&` (or `&mut`) of the bucket slice. Every operation
//!   that may resize takes `&mut BucketHashMap`, so the borrow checker
//!   rejects code that keeps a cursor across a mutation. There is no
//!   runtime generation check and no stale-cursor state to observe.
//! - Reading through the end cursor returns `None`.
//! - `cursor_front()` skips empty leading buckets, so it can be read
//!   whenever the map is non-empty.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the `u64` hash computed at insertion. Rehashing
//!   and lookups use the stored hash, so `K: Hash` is never invoked
//!   after insertion and a resize never calls into user code.
//!
//! Errors
//! - `at` is the only fallible operation: a missing key yields
//!   `KeyNotFound` and leaves the map untouched. Everything else is
//!   total.
//!
//! Logging
//! - Bucket-array rebuilds are reported as `tracing` trace events
//!   (`len`, `from`, `to`). The crate never installs a subscriber.
//!
//! Notes and non-goals
//! - Not thread-safe by itself; wrap in a lock for shared mutation.
//! - No ordered traversal, no persistence.
//! - Keys are immutable post-insert; there is no `key_mut`.

pub mod bucket_hash_map;
#[cfg(test)]
mod bucket_hash_map_proptest;
pub mod cursor;
pub mod iter;
pub mod policy;

// Public surface
pub use bucket_hash_map::{BucketHashMap, KeyNotFound};
pub use cursor::{Cursor, CursorMut};
pub use policy::{ResizePolicy, LOAD_FACTOR, RESIZE_FACTOR};
