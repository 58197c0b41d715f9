//! 哈希表核心 - 拉链表及其桶

pub mod bucket;
pub mod hash_table;

pub use bucket::{Bucket, BucketStore};
pub use hash_table::{HashTable, HashTableConfig};

use once_cell::sync::Lazy;

/// 全局默认配置
pub static DEFAULT_CONFIG: Lazy<HashTableConfig> = Lazy::new(HashTableConfig::default);

/// 表允许的最小桶数量
pub const MIN_CAPACITY: usize = 7;
pub const DEFAULT_CAPACITY: usize = MIN_CAPACITY;
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;
pub const DEFAULT_MIN_LOAD_FACTOR: f64 = 0.25;
