//! Positional cursors over a map's bucket array.
//!
//! A cursor is a `(bucket, slot)` pair plus a borrow of the bucket slice
//! it walks. The end position is `(bucket_count, 0)`. Because the borrow
//! is held for the cursor's lifetime, the map cannot be mutated (and so
//! cannot resize) while a cursor exists.

use crate::bucket_hash_map::Bucket;
use core::fmt;

/// First non-empty bucket at or after `from`, or `buckets.len()`.
fn first_occupied<K, V>(buckets: &[Bucket<K, V>], from: usize) -> usize {
    (from..buckets.len())
        .find(|&b| !buckets[b].is_empty())
        .unwrap_or(buckets.len())
}

/// Position following `(bucket, slot)`. The end position maps to itself.
fn advance<K, V>(buckets: &[Bucket<K, V>], bucket: usize, slot: usize) -> (usize, usize) {
    if bucket >= buckets.len() {
        return (buckets.len(), 0);
    }
    if slot + 1 < buckets[bucket].len() {
        (bucket, slot + 1)
    } else {
        (first_occupied(buckets, bucket + 1), 0)
    }
}

/// Read-only cursor into a [`BucketHashMap`](crate::BucketHashMap).
pub struct Cursor<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    bucket: usize,
    slot: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn at(buckets: &'a [Bucket<K, V>], bucket: usize, slot: usize) -> Self {
        Self {
            buckets,
            bucket,
            slot,
        }
    }

    pub(crate) fn front(buckets: &'a [Bucket<K, V>]) -> Self {
        Self::at(buckets, first_occupied(buckets, 0), 0)
    }

    pub(crate) fn end(buckets: &'a [Bucket<K, V>]) -> Self {
        Self::at(buckets, buckets.len(), 0)
    }

    /// `(bucket, slot)` of this cursor.
    pub fn position(&self) -> (usize, usize) {
        (self.bucket, self.slot)
    }

    pub fn is_end(&self) -> bool {
        self.bucket >= self.buckets.len()
    }

    /// The entry under the cursor; `None` at the end.
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        let e = self.buckets.get(self.bucket)?.get(self.slot)?;
        Some((&e.key, &e.value))
    }

    pub fn key(&self) -> Option<&'a K> {
        self.entry().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.entry().map(|(_, v)| v)
    }

    /// Moves to the next occupied slot, skipping empty buckets.
    pub fn move_next(&mut self) {
        (self.bucket, self.slot) = advance(self.buckets, self.bucket, self.slot);
    }
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

/// Cursors are equal when they walk the same storage and sit on the
/// same slot. Cursors of different maps never compare equal.
impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.buckets, other.buckets)
            && self.bucket == other.bucket
            && self.slot == other.slot
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> fmt::Debug for Cursor<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("bucket", &self.bucket)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Cursor with write access to values. Keys stay immutable.
pub struct CursorMut<'a, K, V> {
    buckets: &'a mut [Bucket<K, V>],
    bucket: usize,
    slot: usize,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(crate) fn at(buckets: &'a mut [Bucket<K, V>], bucket: usize, slot: usize) -> Self {
        Self {
            buckets,
            bucket,
            slot,
        }
    }

    pub(crate) fn front(buckets: &'a mut [Bucket<K, V>]) -> Self {
        let bucket = first_occupied(&*buckets, 0);
        Self::at(buckets, bucket, 0)
    }

    pub(crate) fn end(buckets: &'a mut [Bucket<K, V>]) -> Self {
        let bucket = buckets.len();
        Self::at(buckets, bucket, 0)
    }

    pub fn position(&self) -> (usize, usize) {
        (self.bucket, self.slot)
    }

    pub fn is_end(&self) -> bool {
        self.bucket >= self.buckets.len()
    }

    /// Read-only view of the same position.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::at(&*self.buckets, self.bucket, self.slot)
    }

    pub fn key(&self) -> Option<&K> {
        self.as_cursor().key()
    }

    pub fn value(&self) -> Option<&V> {
        self.as_cursor().value()
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.entry_mut().map(|(_, v)| v)
    }

    pub fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        let e = self.buckets.get_mut(self.bucket)?.get_mut(self.slot)?;
        Some((&e.key, &mut e.value))
    }

    /// Consumes the cursor, keeping the value borrowed for `'a`.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        let CursorMut {
            buckets,
            bucket,
            slot,
        } = self;
        buckets
            .get_mut(bucket)?
            .get_mut(slot)
            .map(|e| &mut e.value)
    }

    pub fn move_next(&mut self) {
        (self.bucket, self.slot) = advance(&*self.buckets, self.bucket, self.slot);
    }
}

impl<'a, K, V> PartialEq for CursorMut<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.as_cursor() == other.as_cursor()
    }
}

impl<'a, K, V> Eq for CursorMut<'a, K, V> {}

impl<'a, K, V> fmt::Debug for CursorMut<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("bucket", &self.bucket)
            .field("slot", &self.slot)
            .finish()
    }
}
