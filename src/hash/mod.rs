//! 哈希模块 - 把键映射到桶索引

pub mod polynomial;
pub mod seeded;
pub mod strategy;

pub use polynomial::{polynomial_hash, PolynomialHasher, POLYNOMIAL_BASE};
pub use seeded::SeededHasher;
pub use strategy::{BucketHasher, HashAlgorithm};

use crate::{
    error::{HashTableError, Result},
    types::Key,
};

/// 按配置的算法创建哈希器
pub fn hasher_for(algorithm: HashAlgorithm) -> Box<dyn BucketHasher> {
    match algorithm {
        HashAlgorithm::Polynomial => Box::new(PolynomialHasher),
        HashAlgorithm::AHash | HashAlgorithm::XxHash => Box::new(SeededHasher::new(algorithm)),
    }
}

/// 把 64 位哈希值归约为桶索引
pub fn calculate_bucket(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// 所有哈希器共用的输入检查
pub(crate) fn check_inputs(key: &Key, capacity: usize) -> Result<()> {
    key.validate()?;
    if capacity == 0 {
        return Err(HashTableError::InvalidCapacity {
            capacity,
            reason: "hash capacity must be a positive integer".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_calculation() {
        assert_eq!(calculate_bucket(123, 100), 23);
        assert_eq!(calculate_bucket(6, 7), 6);
    }

    #[test]
    fn test_hasher_for_reports_algorithm() {
        for algorithm in [
            HashAlgorithm::Polynomial,
            HashAlgorithm::AHash,
            HashAlgorithm::XxHash,
        ] {
            assert_eq!(hasher_for(algorithm).algorithm(), algorithm);
        }
    }

    #[test]
    fn test_every_hasher_stays_in_range() {
        for algorithm in [
            HashAlgorithm::Polynomial,
            HashAlgorithm::AHash,
            HashAlgorithm::XxHash,
        ] {
            let hasher = hasher_for(algorithm);
            for i in 1..200u32 {
                let index = hasher.bucket_index(&Key::from(i), 13).unwrap();
                assert!(index < 13);
            }
        }
    }
}
