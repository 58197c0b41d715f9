//! 拉链法哈希表核心实现 - 素数容量与按负载因子调整大小

use std::fmt;

use crate::{
    error::{HashTableError, Result},
    hash::{hasher_for, BucketHasher, HashAlgorithm},
    map::{
        bucket::BucketStore, DEFAULT_CAPACITY, DEFAULT_CONFIG, DEFAULT_MAX_LOAD_FACTOR,
        DEFAULT_MIN_LOAD_FACTOR, MIN_CAPACITY,
    },
    prime::{is_prime, next_prime_at_or_above},
    stats::{AtomicOperationStats, DisabledOperationRecorder, OperationRecorder, TableStats},
    types::{Entry, Key, OperationType},
};

/// 链长达到该值说明键分布很差
const LONG_CHAIN_WARNING: usize = 8;

/// 哈希表配置
#[derive(Clone, Debug, PartialEq)]
pub struct HashTableConfig {
    /// 创建时和 `clear` 后的桶数量，不小于 7 的素数
    pub initial_capacity: usize,
    /// `size / capacity` 超过该值时扩容
    pub max_load_factor: f64,
    /// `size / capacity` 低于该值时缩容（仅当容量大于 7）
    pub min_load_factor: f64,
    pub hash_algorithm: HashAlgorithm,
    pub collect_stats: bool,
}

impl Default for HashTableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            min_load_factor: DEFAULT_MIN_LOAD_FACTOR,
            hash_algorithm: HashAlgorithm::Polynomial,
            collect_stats: true,
        }
    }
}

impl HashTableConfig {
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_capacity(self.initial_capacity)?;

        let (min, max) = (self.min_load_factor, self.max_load_factor);
        if !(max > 0.0 && max < 1.0) {
            return Err(HashTableError::InvalidConfig {
                reason: format!("max_load_factor {max} must lie in (0, 1)"),
            });
        }
        // 扩容目标 nextprime(2C+1) 总小于 2.5C，缩容目标不小于 C/2，
        // min <= 0.4 * max 时两个方向调整后负载都落在 [min, max] 内
        if !(min >= 0.0 && min * 5.0 <= max * 2.0) {
            return Err(HashTableError::InvalidConfig {
                reason: format!("min_load_factor {min} must be >= 0 and at most 0.4 * max_load_factor {max}"),
            });
        }
        Ok(())
    }
}

fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity < MIN_CAPACITY {
        return Err(HashTableError::InvalidCapacity {
            capacity,
            reason: format!("capacity must be at least {MIN_CAPACITY}"),
        });
    }
    if !is_prime(capacity)? {
        return Err(HashTableError::InvalidCapacity {
            capacity,
            reason: "capacity must be prime".into(),
        });
    }
    Ok(())
}

/// 以字符串或正数为键的拉链法哈希表
///
/// 桶数量始终是不小于 7 的素数。新增键的 `set` 之后，只要负载因子超过
/// `max_load_factor`，就扩容到不小于 `2 * capacity + 1` 的下一个素数；
/// 每次 `delete` 之后，只要负载因子低于 `min_load_factor`，就向
/// `capacity / 2 + 1` 缩容。调整大小会重新哈希所有条目。
///
/// 修改操作需要 `&mut self`，调整过程不会被观察到中间状态。
pub struct HashTable<V> {
    store: BucketStore<V>,
    count: usize,
    config: HashTableConfig,
    hasher: Box<dyn BucketHasher>,
    stats: Box<dyn OperationRecorder>,
}

impl<V> HashTable<V> {
    /// 创建容量为 7 的空表
    pub fn new() -> Self {
        Self::build(DEFAULT_CONFIG.clone())
    }

    /// `capacity` 不是不小于 7 的素数时返回 `InvalidCapacity`
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(HashTableConfig::with_capacity(capacity))
    }

    pub fn with_config(config: HashTableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: HashTableConfig) -> Self {
        let stats: Box<dyn OperationRecorder> = if config.collect_stats {
            Box::new(AtomicOperationStats::new())
        } else {
            Box::new(DisabledOperationRecorder)
        };
        Self {
            store: BucketStore::new(config.initial_capacity),
            count: 0,
            hasher: hasher_for(config.hash_algorithm),
            stats,
            config,
        }
    }

    /// 插入或覆盖键值对，返回表中存储的键值对
    ///
    /// 覆盖不改变大小也不触发调整；新增键可能触发扩容。
    pub fn set(&mut self, key: impl Into<Key>, value: V) -> Result<(&Key, &V)> {
        let key = key.into();
        let index = self.locate(&key)?;

        if let Some(position) = self.store.find(index, &key) {
            self.store.upsert(index, key, value);
            self.stats.record(OperationType::Update, true);
            return self.pair_at(index, position);
        }

        let capacity = self.capacity();
        if self.count == capacity {
            log_error!("table full before expansion: size {} capacity {}", self.count, capacity);
            return Err(HashTableError::CapacityExceeded {
                capacity,
                size: self.count,
            });
        }

        let target = self.expand_target(self.count + 1)?;
        if target != capacity {
            self.check_resize_target(target, self.count + 1)?;
        }

        let (position, _) = self.store.upsert(index, key, value);
        self.count += 1;
        self.stats.record(OperationType::Insert, true);
        if position + 1 >= LONG_CHAIN_WARNING {
            log_warn!("bucket {} chain length {} at capacity {}", index, position + 1, capacity);
        }

        if target == capacity {
            return self.pair_at(index, position);
        }

        // 新条目会在重新哈希时移动
        let key = self.pair_at(index, position)?.0.clone();
        self.resize(target, OperationType::Expand)?;
        let index = self.locate(&key)?;
        let position = self
            .store
            .find(index, &key)
            .ok_or_else(|| self.resize_defect(target))?;
        self.pair_at(index, position)
    }

    /// 获取键对应的值，键不存在时返回 `None`
    pub fn get(&self, key: impl Into<Key>) -> Result<Option<&V>> {
        let key = key.into();
        let index = self.locate(&key)?;
        let value = self
            .store
            .bucket(index)
            .and_then(|bucket| bucket.find(&key).and_then(|position| bucket.entry(position)))
            .map(|entry| &entry.value);
        self.stats.record(OperationType::Get, value.is_some());
        Ok(value)
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> Result<bool> {
        let key = key.into();
        let index = self.locate(&key)?;
        Ok(self.store.find(index, &key).is_some())
    }

    /// 删除键值对并返回被删除的条目，键不存在时返回 `None`
    ///
    /// 删除可能触发缩容。
    pub fn delete(&mut self, key: impl Into<Key>) -> Result<Option<Entry<V>>> {
        let key = key.into();
        let index = self.locate(&key)?;

        let Some(position) = self.store.find(index, &key) else {
            self.stats.record(OperationType::Remove, false);
            return Ok(None);
        };

        let capacity = self.capacity();
        let target = self.shrink_target(self.count - 1)?;
        if target != capacity {
            self.check_resize_target(target, self.count - 1)?;
        }

        let entry = self
            .store
            .remove_at(index, position)
            .ok_or_else(|| self.resize_defect(capacity))?;
        self.count -= 1;
        self.stats.record(OperationType::Remove, true);

        if target != capacity {
            self.resize(target, OperationType::Shrink)?;
        }
        Ok(Some(entry))
    }

    /// 清空所有条目并恢复初始容量
    pub fn clear(&mut self) {
        self.store = BucketStore::new(self.config.initial_capacity);
        self.count = 0;
    }

    pub fn size(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    pub fn config(&self) -> &HashTableConfig {
        &self.config
    }

    /// 按规范字符串形式排序的键，相同时数字在前
    ///
    /// 排序是字典序而非数值序：`10` 排在 `2` 前面。
    pub fn keys(&self) -> Vec<&Key> {
        self.sorted_entries().into_iter().map(|entry| &entry.key).collect()
    }

    /// 按 [`keys`](Self::keys) 顺序排列的值
    pub fn values(&self) -> Vec<&V> {
        self.sorted_entries().into_iter().map(|entry| &entry.value).collect()
    }

    /// 按 [`keys`](Self::keys) 顺序排列的键值对
    pub fn entries(&self) -> Vec<(&Key, &V)> {
        self.sorted_entries()
            .into_iter()
            .map(|entry| (&entry.key, &entry.value))
            .collect()
    }

    /// 按桶顺序遍历，不排序
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &V)> + '_ {
        self.store.iter().map(|entry| (&entry.key, &entry.value))
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            size: self.count,
            capacity: self.capacity(),
            load_factor: self.load_factor(),
            occupied_buckets: self.store.occupied_buckets(),
            longest_chain: self.store.longest_chain(),
            operations: self.stats.snapshot(),
        }
    }

    /// 导出Prometheus格式指标
    pub fn export_prometheus(&self) -> String {
        self.stats().export_prometheus(self.stats.as_ref())
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// 检查表的全部结构不变量
    ///
    /// 容量是不小于 7 的素数；大小与各链条目总数一致，且不超过容量和
    /// `max_load_factor`；容量离开初始值且大于 7 时负载不低于
    /// `min_load_factor`；每个条目都位于其键哈希到的桶中；没有重复键。
    ///
    /// 仍处于初始容量的表不检查下限：`with_capacity(101)` 创建的空表
    /// 在第一次调整之前本就低于 `min_load_factor`。
    pub fn invariants(&self) -> bool {
        let capacity = self.capacity();
        if capacity < MIN_CAPACITY || !is_prime(capacity).unwrap_or(false) {
            return false;
        }
        if self.count > capacity || self.load_factor() > self.config.max_load_factor {
            return false;
        }
        if capacity > MIN_CAPACITY
            && capacity != self.config.initial_capacity
            && self.below_min(self.count, capacity)
        {
            return false;
        }

        let mut seen = std::collections::HashSet::with_capacity(self.count);
        let mut total = 0;
        for (index, bucket) in self.store.chains() {
            for entry in bucket.iter() {
                total += 1;
                if self.hasher.bucket_index(&entry.key, capacity).ok() != Some(index) {
                    return false;
                }
                if !seen.insert(&entry.key) {
                    return false;
                }
            }
        }
        total == self.count
    }

    fn locate(&self, key: &Key) -> Result<usize> {
        self.hasher.bucket_index(key, self.capacity()).map_err(|err| {
            log_debug!("rejected key {}: {}", key, err);
            err
        })
    }

    /// 获取刚由存储层返回的位置上的键值对
    fn pair_at(&self, index: usize, position: usize) -> Result<(&Key, &V)> {
        let entry = self
            .store
            .entry(index, position)
            .ok_or_else(|| self.resize_defect(self.capacity()))?;
        Ok((&entry.key, &entry.value))
    }

    fn sorted_entries(&self) -> Vec<&Entry<V>> {
        let mut entries: Vec<&Entry<V>> = self.store.iter().collect();
        entries.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    fn exceeds_max(&self, count: usize, capacity: usize) -> bool {
        count as f64 / capacity as f64 > self.config.max_load_factor
    }

    fn below_min(&self, count: usize, capacity: usize) -> bool {
        count as f64 / (capacity as f64) < self.config.min_load_factor
    }

    /// 插入后持有 `count` 个条目时应有的容量
    fn expand_target(&self, count: usize) -> Result<usize> {
        let mut target = self.capacity();
        while self.exceeds_max(count, target) {
            let doubled = target
                .checked_mul(2)
                .and_then(|t| t.checked_add(1))
                .ok_or(HashTableError::InvalidArgument {
                    value: target,
                    reason: "capacity cannot double without overflow",
                })?;
            target = next_prime_at_or_above(doubled)?;
        }
        Ok(target)
    }

    /// 删除后持有 `count` 个条目时应有的容量
    fn shrink_target(&self, count: usize) -> Result<usize> {
        let mut target = self.capacity();
        while target > MIN_CAPACITY && self.below_min(count, target) {
            let next = next_prime_at_or_above(target / 2 + 1)?.max(MIN_CAPACITY);
            if next >= target {
                break;
            }
            target = next;
        }
        Ok(target)
    }

    fn check_resize_target(&self, target: usize, count: usize) -> Result<()> {
        let valid = target >= MIN_CAPACITY
            && target >= count
            && target != self.capacity()
            && is_prime(target)?;
        if valid {
            Ok(())
        } else {
            Err(self.resize_defect(target))
        }
    }

    fn resize_defect(&self, target: usize) -> HashTableError {
        log_error!(
            "resize to {} rejected: capacity {} size {}",
            target,
            self.capacity(),
            self.count
        );
        HashTableError::InvalidResizeTarget {
            target,
            capacity: self.capacity(),
            size: self.count,
        }
    }

    /// 将所有条目重新哈希到 `target` 个桶的新数组
    ///
    /// 先算出全部新索引再替换旧数组，失败时表保持不变。
    fn resize(&mut self, target: usize, kind: OperationType) -> Result<()> {
        self.check_resize_target(target, self.count)?;

        let indices = self
            .store
            .iter()
            .map(|entry| self.hasher.bucket_index(&entry.key, target))
            .collect::<Result<Vec<usize>>>()?;

        let from = self.capacity();
        let old = std::mem::replace(&mut self.store, BucketStore::new(target));
        self.count = 0;
        for (entry, index) in old.into_entries().into_iter().zip(indices) {
            self.store.upsert(index, entry.key, entry.value);
            self.count += 1;
        }

        self.stats.record(kind, true);
        self.stats.record_rehash(self.count);
        log_info!(
            "{} from {} to {} buckets, {} entries rehashed",
            kind.as_str(),
            from,
            target,
            self.count
        );
        Ok(())
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("size", &self.count)
            .field("capacity", &self.capacity())
            .field("load_factor", &self.load_factor())
            .field("hash_algorithm", &self.hasher.algorithm())
            .finish()
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(keys: &[&str]) -> HashTable<usize> {
        let mut table = HashTable::new();
        for (i, key) in keys.iter().enumerate() {
            table.set(*key, i).unwrap();
        }
        table
    }

    #[test]
    fn test_new_table() {
        let table: HashTable<u32> = HashTable::new();
        assert_eq!(table.capacity(), 7);
        assert_eq!(table.size(), 0);
        assert!(table.is_empty());
        assert!(table.invariants());
    }

    #[test]
    fn test_with_capacity_validation() {
        assert!(HashTable::<u32>::with_capacity(11).is_ok());
        for capacity in [0, 1, 2, 5, 8, 9, 15] {
            assert!(
                matches!(
                    HashTable::<u32>::with_capacity(capacity),
                    Err(HashTableError::InvalidCapacity { .. })
                ),
                "capacity {capacity} accepted"
            );
        }
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            HashTableConfig {
                max_load_factor: 1.0,
                ..Default::default()
            },
            HashTableConfig {
                max_load_factor: 0.0,
                ..Default::default()
            },
            HashTableConfig {
                min_load_factor: 0.4,
                ..Default::default()
            },
            HashTableConfig {
                min_load_factor: -0.1,
                ..Default::default()
            },
            HashTableConfig {
                max_load_factor: 0.5,
                min_load_factor: 0.24,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                HashTable::<u32>::with_config(config),
                Err(HashTableError::InvalidConfig { .. })
            ));
        }
        assert!(HashTableConfig::default().validate().is_ok());
        let edge = HashTableConfig {
            max_load_factor: 0.5,
            min_load_factor: 0.2,
            ..Default::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_expansion_respects_min_load_factor() {
        let config = HashTableConfig {
            max_load_factor: 0.5,
            min_load_factor: 0.2,
            ..Default::default()
        };
        let mut table = HashTable::with_config(config).unwrap();
        for i in 1..=200u32 {
            let before = table.capacity();
            table.set(i, i).unwrap();
            if table.capacity() != before {
                assert!(
                    table.load_factor() >= 0.2,
                    "load {} after expanding to {}",
                    table.load_factor(),
                    table.capacity()
                );
            }
            assert!(table.invariants());
        }
    }

    #[test]
    fn test_pair_at_missing_slot_is_internal_error() {
        let table = table_with(&["a"]);
        let index = table.locate(&Key::from("a")).unwrap();
        assert!(table.pair_at(index, 0).is_ok());
        let err = table.pair_at(index, 5).unwrap_err();
        assert!(err.is_internal());
        assert!(matches!(err, HashTableError::InvalidResizeTarget { .. }));
    }

    #[test]
    fn test_invariants_check_min_load_after_resize() {
        let table: HashTable<u32> = HashTable::with_capacity(101).unwrap();
        assert!(table.invariants());

        let mut table = table_with(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(table.capacity(), 17);
        assert!(table.invariants());
        // 容量 17 下只剩 2 个条目而未缩容
        table.store = BucketStore::new(17);
        for key in ["a", "b"] {
            let key = Key::from(key);
            let index = table.locate(&key).unwrap();
            table.store.upsert(index, key, 0);
        }
        table.count = 2;
        assert!(!table.invariants());
    }

    #[test]
    fn test_set_returns_stored_pair() {
        let mut table = HashTable::new();
        let (key, value) = table.set("a", 1).unwrap();
        assert_eq!(key, &Key::from("a"));
        assert_eq!(*value, 1);
    }

    #[test]
    fn test_set_returns_pair_after_expansion() {
        let mut table = table_with(&["a", "b", "c", "d", "e"]);
        assert_eq!(table.capacity(), 7);
        let (key, value) = table.set("f", 5).unwrap();
        assert_eq!(key, &Key::from("f"));
        assert_eq!(*value, 5);
        assert_eq!(table.capacity(), 17);
    }

    #[test]
    fn test_overwrite_keeps_size() {
        let mut table = table_with(&["a", "b"]);
        table.set("a", 10).unwrap();
        assert_eq!(table.size(), 2);
        assert_eq!(table.get("a").unwrap(), Some(&10));
        assert_eq!(table.stats().operations.update_count, 1);
    }

    #[test]
    fn test_invalid_key_leaves_table_untouched() {
        let mut table = table_with(&["a"]);
        assert!(matches!(
            table.set("", 1),
            Err(HashTableError::InvalidKey { .. })
        ));
        assert!(table.set(0, 1).is_err());
        assert!(table.set(-2.5, 1).is_err());
        assert!(table.get("").is_err());
        assert!(table.delete(0).is_err());
        assert_eq!(table.size(), 1);
        assert!(table.invariants());
    }

    #[test]
    fn test_delete_returns_entry() {
        let mut table = table_with(&["a", "b"]);
        let entry = table.delete("a").unwrap().unwrap();
        assert_eq!(entry.into_pair(), (Key::from("a"), 0));
        assert_eq!(table.delete("a").unwrap(), None);
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_string_and_numeric_keys_coexist() {
        let mut table = HashTable::new();
        table.set("1", "string").unwrap();
        table.set(1, "number").unwrap();
        assert_eq!(table.size(), 2);
        assert_eq!(table.get("1").unwrap(), Some(&"string"));
        assert_eq!(table.get(1).unwrap(), Some(&"number"));
        assert_eq!(table.keys(), vec![&Key::from(1), &Key::from("1")]);
    }

    #[test]
    fn test_expand_target() {
        let table: HashTable<u32> = HashTable::new();
        assert_eq!(table.expand_target(5).unwrap(), 7);
        assert_eq!(table.expand_target(6).unwrap(), 17);
    }

    #[test]
    fn test_shrink_target_floor() {
        let table: HashTable<u32> = HashTable::new();
        assert_eq!(table.shrink_target(0).unwrap(), 7);

        let table: HashTable<u32> = HashTable::with_capacity(17).unwrap();
        assert_eq!(table.shrink_target(5).unwrap(), 17);
        assert_eq!(table.shrink_target(4).unwrap(), 11);
        assert_eq!(table.shrink_target(0).unwrap(), 7);
    }

    #[test]
    fn test_check_resize_target() {
        let table: HashTable<u32> = HashTable::with_capacity(17).unwrap();
        assert!(table.check_resize_target(11, 4).is_ok());
        for (target, count) in [(17, 4), (5, 4), (12, 4), (11, 12)] {
            let err = table.check_resize_target(target, count).unwrap_err();
            assert!(err.is_internal());
        }
    }

    #[test]
    fn test_clear_resets_capacity() {
        let mut table = table_with(&["a", "b", "c", "d", "e", "f", "g"]);
        assert!(table.capacity() > 7);
        table.clear();
        assert_eq!(table.capacity(), 7);
        assert!(table.is_empty());
        assert_eq!(table.get("a").unwrap(), None);
    }

    #[test]
    fn test_stats_snapshot() {
        let mut table = table_with(&["a", "b", "c", "d", "e", "f"]);
        table.get("a").unwrap();
        table.get("zz").unwrap();
        let stats = table.stats();
        assert_eq!(stats.size, 6);
        assert_eq!(stats.capacity, 17);
        assert_eq!(stats.operations.insert_count, 6);
        assert_eq!(stats.operations.expand_count, 1);
        assert_eq!(stats.operations.rehashed_entries, 6);
        assert_eq!(stats.operations.get_count, 2);
        assert_eq!(stats.operations.miss_count, 1);
        assert!(stats.longest_chain >= 1);
        assert!(table.export_prometheus().contains("hashtable_size 6\n"));

        table.reset_stats();
        assert_eq!(table.stats().operations.insert_count, 0);
    }

    #[test]
    fn test_disabled_stats() {
        let config = HashTableConfig {
            collect_stats: false,
            ..Default::default()
        };
        let mut table = HashTable::with_config(config).unwrap();
        table.set("a", 1).unwrap();
        assert_eq!(table.stats().operations.insert_count, 0);
        assert_eq!(table.stats().size, 1);
    }

    #[test]
    fn test_seeded_algorithms_keep_invariants() {
        for hash_algorithm in [HashAlgorithm::AHash, HashAlgorithm::XxHash] {
            let config = HashTableConfig {
                hash_algorithm,
                ..Default::default()
            };
            let mut table = HashTable::with_config(config).unwrap();
            for i in 1..=100u32 {
                table.set(i, i).unwrap();
                assert!(table.invariants());
            }
            for i in 1..=100u32 {
                assert_eq!(table.get(i).unwrap(), Some(&i));
            }
            for i in 1..=95u32 {
                table.delete(i).unwrap();
                assert!(table.invariants());
            }
            assert_eq!(table.size(), 5);
        }
    }

    #[test]
    fn test_debug_output() {
        let table: HashTable<u32> = HashTable::new();
        let debug = format!("{table:?}");
        assert!(debug.contains("capacity: 7"));
        assert!(debug.contains("Polynomial"));
    }
}
