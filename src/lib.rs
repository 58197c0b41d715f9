//! 素数桶数量的拉链法哈希表
//!
//! 键为非空字符串或正数。每个键通过其规范字符串形式上的 37 进制多项式
//! 映射到桶；冲突的键共享一条按插入顺序排列的链。负载因子超过 0.75 时扩容，
//! 低于 0.25 时缩容，桶数量始终是不小于 7 的素数，调整时重新哈希所有条目。
//!
//! ## 快速开始
//!
//! ```rust
//! use prime_chain::HashTable;
//!
//! let mut table = HashTable::new();
//! table.set("alpha", 1).unwrap();
//! table.set(42, 2).unwrap();
//!
//! assert_eq!(table.get("alpha").unwrap(), Some(&1));
//! assert_eq!(table.get("missing").unwrap(), None);
//!
//! let removed = table.delete(42).unwrap();
//! assert!(removed.is_some());
//! assert_eq!(table.size(), 1);
//! ```
//!
//! 启用 `logging` 特性后，调整大小和错误诊断信息会输出到
//! [`log`](https://docs.rs/log) 门面。

#![warn(clippy::all)]

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

// 关闭日志时参数仍参与类型检查并视为已使用
#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if false {
            let _ = ::std::format!($($arg)*);
        }
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if false {
            let _ = ::std::format!($($arg)*);
        }
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if false {
            let _ = ::std::format!($($arg)*);
        }
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if false {
            let _ = ::std::format!($($arg)*);
        }
    };
}

pub mod error;
pub mod hash;
pub mod map;
pub mod prime;
pub mod stats;
pub mod types;

pub use crate::{
    error::{HashTableError, Result},
    hash::{polynomial_hash, BucketHasher, HashAlgorithm, PolynomialHasher, SeededHasher},
    map::{
        Bucket, BucketStore, HashTable, HashTableConfig, DEFAULT_CAPACITY, DEFAULT_CONFIG,
        MIN_CAPACITY,
    },
    prime::{is_prime, next_prime_at_or_above},
    stats::{OperationStatsSnapshot, TableStats},
    types::{Entry, Key, OperationType, MAX_SAFE_INTEGER},
};

/// 存储字符串值的表
pub type DefaultTable = HashTable<String>;
