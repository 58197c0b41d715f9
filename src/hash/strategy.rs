//! 哈希策略 - 哈希表与哈希函数之间的接口

use crate::{error::Result, types::Key};

/// 哈希算法选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// 键 UTF-16 码元上的 37 进制多项式
    #[default]
    Polynomial,
    /// 固定种子的 aHash
    AHash,
    /// 固定种子的 XXH3
    XxHash,
}

/// 按给定容量把键映射到桶索引
///
/// 实现必须是确定性的：相同的键和容量总得到相同索引，且索引总小于 `capacity`。
pub trait BucketHasher: Send + Sync {
    /// `0..capacity` 范围内的桶索引
    fn bucket_index(&self, key: &Key, capacity: usize) -> Result<usize>;

    fn algorithm(&self) -> HashAlgorithm;
}

/// 字节哈希函数
pub trait HasherFunction: Send + Sync {
    fn hash_bytes(&self, data: &[u8]) -> u64;
}

impl<T> HasherFunction for T
where
    T: Fn(&[u8]) -> u64 + Send + Sync,
{
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        self(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_hasher_function() {
        let f = |data: &[u8]| data.len() as u64;
        assert_eq!(f.hash_bytes(b"abcd"), 4);
    }

    #[test]
    fn test_default_algorithm_is_polynomial() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Polynomial);
    }
}
