// src/map/bucket.rs
//! 桶 - 冲突链及存放它们的数组

use std::fmt;

use crate::types::{Entry, Key};

/// 一条冲突链，保持插入顺序
#[derive(Clone, PartialEq)]
pub struct Bucket<V> {
    entries: Vec<Entry<V>>,
}

impl<V> fmt::Debug for Bucket<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bucket(entries: {})", self.entries.len())
    }
}

impl<V> Default for Bucket<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Bucket<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按插入顺序扫描，返回第一个匹配 `key` 的位置
    pub fn find(&self, key: &Key) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == *key)
    }

    pub fn entry(&self, index: usize) -> Option<&Entry<V>> {
        self.entries.get(index)
    }

    /// 原地覆盖已有键的值，或在链尾追加新条目
    ///
    /// 返回条目位置和被替换的旧值（如有）。
    pub fn upsert(&mut self, key: Key, value: V) -> (usize, Option<V>) {
        match self.find(&key) {
            Some(index) => {
                let old = std::mem::replace(&mut self.entries[index].value, value);
                (index, Some(old))
            }
            None => {
                self.entries.push(Entry::new(key, value));
                (self.entries.len() - 1, None)
            }
        }
    }

    /// 删除 `index` 处的条目，其余条目保持顺序
    pub fn remove_at(&mut self, index: usize) -> Option<Entry<V>> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry<V>> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<Entry<V>> {
        self.entries
    }
}

/// 惰性创建桶的定长数组
pub struct BucketStore<V> {
    buckets: Vec<Option<Bucket<V>>>,
}

impl<V> fmt::Debug for BucketStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketStore")
            .field("capacity", &self.capacity())
            .field("occupied", &self.occupied_buckets())
            .finish()
    }
}

impl<V> BucketStore<V> {
    pub fn new(capacity: usize) -> Self {
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, || None);
        Self { buckets }
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// 索引越界或桶从未写入时返回 `None`
    pub fn bucket(&self, index: usize) -> Option<&Bucket<V>> {
        self.buckets.get(index).and_then(Option::as_ref)
    }

    pub fn bucket_mut(&mut self, index: usize) -> Option<&mut Bucket<V>> {
        self.buckets.get_mut(index).and_then(Option::as_mut)
    }

    /// 首次使用时创建桶
    ///
    /// `index >= capacity` 时 panic；调用方只传入该容量下哈希器产生的索引。
    pub fn bucket_or_insert(&mut self, index: usize) -> &mut Bucket<V> {
        self.buckets[index].get_or_insert_with(Bucket::new)
    }

    pub fn find(&self, index: usize, key: &Key) -> Option<usize> {
        self.bucket(index).and_then(|bucket| bucket.find(key))
    }

    pub fn entry(&self, index: usize, position: usize) -> Option<&Entry<V>> {
        self.bucket(index).and_then(|bucket| bucket.entry(position))
    }

    pub fn upsert(&mut self, index: usize, key: Key, value: V) -> (usize, Option<V>) {
        self.bucket_or_insert(index).upsert(key, value)
    }

    pub fn remove_at(&mut self, index: usize, position: usize) -> Option<Entry<V>> {
        self.bucket_mut(index)
            .and_then(|bucket| bucket.remove_at(position))
    }

    /// 按桶索引升序、链内顺序遍历所有条目
    pub fn iter(&self) -> impl Iterator<Item = &Entry<V>> + '_ {
        self.buckets.iter().flatten().flat_map(Bucket::iter)
    }

    /// 消耗存储，按 [`iter`](Self::iter) 的顺序返回条目
    pub fn into_entries(self) -> Vec<Entry<V>> {
        self.buckets
            .into_iter()
            .flatten()
            .flat_map(Bucket::into_entries)
            .collect()
    }

    pub fn occupied_buckets(&self) -> usize {
        self.buckets
            .iter()
            .flatten()
            .filter(|bucket| !bucket.is_empty())
            .count()
    }

    pub fn longest_chain(&self) -> usize {
        self.buckets
            .iter()
            .flatten()
            .map(Bucket::len)
            .max()
            .unwrap_or(0)
    }

    /// 带桶索引的链，跳过从未写入的桶
    pub fn chains(&self) -> impl Iterator<Item = (usize, &Bucket<V>)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter_map(|(index, bucket)| bucket.as_ref().map(|bucket| (index, bucket)))
    }
}
