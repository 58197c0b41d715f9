//! 固定种子的通用哈希函数

use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;

use crate::{
    error::Result,
    hash::{
        calculate_bucket, check_inputs,
        strategy::{BucketHasher, HashAlgorithm, HasherFunction},
    },
    types::Key,
};

const SEED: usize = 37;

/// 对规范键字节计算 aHash 或 XXH3，种子固定，进程内放置位置可复现
pub struct SeededHasher {
    function: Box<dyn HasherFunction>,
    algorithm: HashAlgorithm,
}

impl SeededHasher {
    /// `HashAlgorithm::Polynomial` 不是带种子的哈希，映射为 XXH3
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let algorithm = match algorithm {
            HashAlgorithm::AHash => HashAlgorithm::AHash,
            HashAlgorithm::XxHash | HashAlgorithm::Polynomial => HashAlgorithm::XxHash,
        };
        Self {
            function: Self::build_hasher_function(algorithm),
            algorithm,
        }
    }

    fn build_hasher_function(algorithm: HashAlgorithm) -> Box<dyn HasherFunction> {
        match algorithm {
            HashAlgorithm::AHash => {
                let state = RandomState::with_seed(SEED);
                Box::new(move |data: &[u8]| {
                    let mut hasher = state.build_hasher();
                    data.hash(&mut hasher);
                    hasher.finish()
                })
            }
            HashAlgorithm::XxHash | HashAlgorithm::Polynomial => Box::new(|data: &[u8]| {
                twox_hash::xxh3::hash64_with_seed(data, SEED as u64)
            }),
        }
    }
}

impl std::fmt::Debug for SeededHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededHasher")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl BucketHasher for SeededHasher {
    fn bucket_index(&self, key: &Key, capacity: usize) -> Result<usize> {
        check_inputs(key, capacity)?;
        let hash = self.function.hash_bytes(key.canonical().as_bytes());
        Ok(calculate_bucket(hash, capacity))
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}
