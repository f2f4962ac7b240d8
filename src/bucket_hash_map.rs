//! BucketHashMap: separate-chaining table with a load-factor resize policy.

use crate::cursor::{Cursor, CursorMut};
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::policy::ResizePolicy;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::Equivalent;
use std::collections::hash_map::RandomState;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

pub(crate) type Bucket<K, V> = Vec<Entry<K, V>>;

/// Error returned by [`BucketHashMap::at`] for a missing key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found")
    }
}

impl std::error::Error for KeyNotFound {}

#[inline]
fn bucket_index(hash: u64, buckets: usize) -> usize {
    (hash % buckets as u64) as usize
}

fn empty_buckets<K, V>(n: usize) -> Vec<Bucket<K, V>> {
    let mut buckets = Vec::with_capacity(n);
    buckets.resize_with(n, Vec::new);
    buckets
}

/// A hash map storing entries in a vector of buckets, one `Vec` per
/// bucket.
///
/// Inserting a key that is already present leaves the stored value
/// untouched. Iteration walks buckets in ascending order and each bucket
/// in insertion order.
pub struct BucketHashMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    policy: ResizePolicy,
}

impl<K, V> BucketHashMap<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_policy(policy: ResizePolicy) -> Self {
        Self::with_hasher_and_policy(RandomState::new(), policy)
    }
}

impl<K, V, S: Default> Default for BucketHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

// Accessors that never hash.
impl<K, V, S> BucketHashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_hasher_and_policy(hasher, ResizePolicy::default())
    }

    pub fn with_hasher_and_policy(hasher: S, policy: ResizePolicy) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(1),
            len: 0,
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn policy(&self) -> ResizePolicy {
        self.policy
    }

    /// Current number of buckets; always at least one.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Drops every entry and returns to a single empty bucket.
    pub fn clear(&mut self) {
        if self.buckets.len() > 1 {
            tracing::trace!(len = self.len, from = self.buckets.len(), "clear buckets");
        }
        self.buckets = empty_buckets(1);
        self.len = 0;
    }

    /// Cursor at the first entry, or at the end if the map is empty.
    ///
    /// Empty leading buckets are skipped, so the cursor can always be
    /// read when the map is non-empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor::front(&self.buckets)
    }

    /// The end cursor, positioned at `(bucket_count, 0)`.
    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        Cursor::end(&self.buckets)
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V> {
        CursorMut::front(&mut self.buckets)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.cursor_front(), self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.buckets, self.len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<K, V, S> BucketHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn locate_hashed<Q>(&self, hash: u64, q: &Q) -> Option<(usize, usize)>
    where
        Q: ?Sized + Equivalent<K>,
    {
        let b = bucket_index(hash, self.buckets.len());
        self.buckets[b]
            .iter()
            .position(|e| e.hash == hash && q.equivalent(&e.key))
            .map(|s| (b, s))
    }

    fn locate<Q>(&self, q: &Q) -> Option<(usize, usize)>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        if self.is_empty() {
            return None;
        }
        self.locate_hashed(self.make_hash(q), q)
    }

    /// Rebuilds the bucket array with `to` buckets. Entries keep their
    /// cached hash, so `K: Hash` is not called again.
    fn rehash(&mut self, to: usize) {
        tracing::trace!(len = self.len, from = self.buckets.len(), to, "rehash buckets");
        let old = core::mem::replace(&mut self.buckets, empty_buckets(to));
        for entry in old.into_iter().flatten() {
            let b = bucket_index(entry.hash, to);
            self.buckets[b].push(entry);
        }
    }

    /// Resizes so that `len` entries satisfy the policy.
    fn rebalance(&mut self, len: usize) {
        let to = self.policy.target_buckets(len, self.buckets.len());
        if to != self.buckets.len() {
            self.rehash(to);
        }
    }

    /// Appends an entry whose key is known to be absent and returns its
    /// position. The layout is grown first, so the position stays valid.
    fn push_new(&mut self, entry: Entry<K, V>) -> (usize, usize) {
        self.rebalance(self.len + 1);
        let b = bucket_index(entry.hash, self.buckets.len());
        self.buckets[b].push(entry);
        self.len += 1;
        (b, self.buckets[b].len() - 1)
    }

    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Returns `false` and drops `value` on a duplicate; the stored
    /// value is never overwritten.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.make_hash(&key);
        if self.locate_hashed(hash, &key).is_some() {
            return false;
        }
        self.push_new(Entry { key, value, hash });
        true
    }

    /// Returns the value for `key`, inserting `default()` first if the
    /// key is absent. `default` only runs on insertion.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let (b, s) = match self.locate_hashed(hash, &key) {
            Some(pos) => pos,
            None => {
                let value = default();
                self.push_new(Entry { key, value, hash })
            }
        };
        &mut self.buckets[b][s].value
    }

    /// Indexed access: the value for `key`, default-inserted if absent.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes the entry for `q`, returning it. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let (b, s) = self.locate(q)?;
        // Vec::remove keeps the rest of the bucket in insertion order.
        let entry = self.buckets[b].remove(s);
        self.len -= 1;
        self.rebalance(self.len);
        Some((entry.key, entry.value))
    }

    /// Cursor at the entry for `q`, or the end cursor.
    pub fn find<Q>(&self, q: &Q) -> Cursor<'_, K, V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        match self.locate(q) {
            Some((b, s)) => Cursor::at(&self.buckets, b, s),
            None => self.cursor_end(),
        }
    }

    pub fn find_mut<Q>(&mut self, q: &Q) -> CursorMut<'_, K, V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        match self.locate(q) {
            Some((b, s)) => CursorMut::at(&mut self.buckets, b, s),
            None => CursorMut::end(&mut self.buckets),
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.locate(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.locate(q).map(|(b, s)| &self.buckets[b][s].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let (b, s) = self.locate(q)?;
        Some(&mut self.buckets[b][s].value)
    }

    /// Read-only lookup that fails with [`KeyNotFound`] instead of
    /// inserting. The map is never modified.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, KeyNotFound>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.get(q).ok_or(KeyNotFound)
    }

    /// Builds a map from `iter` with the given hasher. Duplicate keys
    /// keep their first occurrence.
    pub fn from_iter_with_hasher<I>(iter: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hasher);
        map.extend(iter);
        map
    }

    #[cfg(test)]
    pub(crate) fn check_layout(&self) {
        assert!(!self.buckets.is_empty(), "bucket array must not be empty");
        let mut total = 0;
        for (b, bucket) in self.buckets.iter().enumerate() {
            for e in bucket {
                assert_eq!(bucket_index(e.hash, self.buckets.len()), b);
                assert_eq!(e.hash, self.make_hash(&e.key), "cached hash is stale");
                total += 1;
            }
        }
        assert_eq!(total, self.len, "len out of sync with buckets");
        assert!(
            self.policy.is_balanced(self.len, self.buckets.len()),
            "len={} buckets={} violates the resize policy",
            self.len,
            self.buckets.len()
        );
    }
}

impl<K, V, S> Extend<(K, V)> for BucketHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for BucketHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with_hasher(iter, S::default())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for BucketHashMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, V, S> Clone for BucketHashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut out = Self::with_hasher_and_policy(self.hasher.clone(), self.policy);
        out.clone_from(self);
        out
    }

    /// Clears `self`, then inserts every entry of `source` in the order
    /// `source` iterates them. `self` keeps its own hasher and policy.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        for (k, v) in source.iter() {
            self.insert(k.clone(), v.clone());
        }
    }
}

impl<K, V, S> fmt::Debug for BucketHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for BucketHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for BucketHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<'a, K, V, S> IntoIterator for &'a BucketHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut BucketHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for BucketHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.buckets, self.len)
    }
}
